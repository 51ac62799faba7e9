use crate::handler::{validate, HandlerRef, InvalidHandler, ResolvedHandler};
use crate::registry::TypeRegistry;
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// One registered `(path, method)` → handler binding plus metadata.
///
/// A route is uniquely identified by its `(path, method)` pair; registering
/// the same pair again replaces the prior route wholesale, including its name
/// and reserved fields.
#[derive(Debug, Clone)]
pub struct Route {
    /// HTTP method this route answers to.
    pub method: Method,
    /// Registered path, stored verbatim.
    pub path: String,
    /// Handler resolved at registration time; never re-parsed at dispatch.
    pub handler: ResolvedHandler,
    /// Optional route name set through [`RouteHandle::name`].
    pub name: Option<String>,
    /// Reserved for pre-dispatch handlers. Always empty; no mutator yet.
    pub before: Vec<HandlerRef>,
    /// Reserved for post-dispatch handlers. Always empty; no mutator yet.
    pub after: Vec<HandlerRef>,
    /// Reserved path-parameter constraints. Always empty; no mutator yet.
    pub constraints: HashMap<String, String>,
}

/// Route table builder and exact-pair lookup.
///
/// Registration validates the handler against the host's
/// [`TypeRegistry`](crate::registry::TypeRegistry) before anything is stored,
/// then returns a [`RouteHandle`] for attribute tagging. Lookup is exact on
/// `(path, method)`; pattern matching belongs to the host's dispatcher.
pub struct Router {
    registry: Arc<dyn TypeRegistry + Send + Sync>,
    routes: HashMap<String, HashMap<Method, Route>>,
}

impl Router {
    /// Create an empty route table backed by the host's type registry.
    #[must_use]
    pub fn new(registry: Arc<dyn TypeRegistry + Send + Sync>) -> Self {
        Self {
            registry,
            routes: HashMap::new(),
        }
    }

    /// Register a GET route.
    pub fn get(
        &mut self,
        path: impl Into<String>,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteHandle<'_>, InvalidHandler> {
        self.add_route(Method::GET, path.into(), handler.into())
    }

    /// Register a POST route.
    pub fn post(
        &mut self,
        path: impl Into<String>,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteHandle<'_>, InvalidHandler> {
        self.add_route(Method::POST, path.into(), handler.into())
    }

    /// Register a PUT route.
    pub fn put(
        &mut self,
        path: impl Into<String>,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteHandle<'_>, InvalidHandler> {
        self.add_route(Method::PUT, path.into(), handler.into())
    }

    /// Register a DELETE route.
    pub fn delete(
        &mut self,
        path: impl Into<String>,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteHandle<'_>, InvalidHandler> {
        self.add_route(Method::DELETE, path.into(), handler.into())
    }

    /// Validate, resolve, and store a route; replaces any prior route at the
    /// same `(path, method)` pair. No partial registration: a handler that
    /// fails validation leaves the table untouched.
    fn add_route(
        &mut self,
        method: Method,
        path: String,
        handler: HandlerRef,
    ) -> Result<RouteHandle<'_>, InvalidHandler> {
        let resolved = validate(&handler, self.registry.as_ref())?;

        let route = Route {
            method: method.clone(),
            path: path.clone(),
            handler: resolved,
            name: None,
            before: Vec::new(),
            after: Vec::new(),
            constraints: HashMap::new(),
        };

        let replaced = self
            .routes
            .entry(path.clone())
            .or_default()
            .insert(method.clone(), route)
            .is_some();

        info!(
            method = %method,
            path = %path,
            replaced = replaced,
            "Route registered"
        );

        Ok(RouteHandle {
            router: self,
            path,
            method,
        })
    }

    /// Look up a route by exact `(path, method)` pair.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<&Route> {
        let found = self.routes.get(path).and_then(|by_method| by_method.get(method));
        debug!(
            method = %method,
            path = %path,
            found = found.is_some(),
            "Route table lookup"
        );
        found
    }

    /// Number of registered routes across all paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    /// Whether the table holds no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterate over all registered routes. No ordering guarantee across
    /// paths or methods.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.values().flat_map(HashMap::values)
    }

    /// Print all registered routes to stdout.
    ///
    /// Useful for debugging and verifying that routes are registered.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.len());
        for route in self.iter() {
            println!(
                "[route] {} {} -> {:?} name={:?}",
                route.method, route.path, route.handler, route.name
            );
        }
    }
}

/// Pending-route handle returned by each registration call.
///
/// Attribute setters live here rather than on the router so that a call like
/// [`name`](Self::name) can only ever bind to the route whose registration
/// produced the handle. The handle borrows the router mutably, so no other
/// registration can slip in between a registration and its attribute calls.
///
/// The handle re-exposes the registration methods, consuming itself, which
/// keeps fluent chains working:
///
/// ```rust,ignore
/// router.get("/pets", "PetController@index")?.name("pets.index")
///       .post("/pets", "PetController@create")?.name("pets.create");
/// ```
pub struct RouteHandle<'r> {
    router: &'r mut Router,
    path: String,
    method: Method,
}

impl std::fmt::Debug for RouteHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteHandle")
            .field("path", &self.path)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

impl<'r> RouteHandle<'r> {
    /// Name the route this handle was created for.
    pub fn name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        if let Some(route) = self
            .router
            .routes
            .get_mut(&self.path)
            .and_then(|by_method| by_method.get_mut(&self.method))
        {
            debug!(
                method = %self.method,
                path = %self.path,
                name = %name,
                "Route named"
            );
            route.name = Some(name);
        }
        self
    }

    /// Register a GET route, moving the chain to the new route.
    pub fn get(
        self,
        path: impl Into<String>,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteHandle<'r>, InvalidHandler> {
        self.router.add_route(Method::GET, path.into(), handler.into())
    }

    /// Register a POST route, moving the chain to the new route.
    pub fn post(
        self,
        path: impl Into<String>,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteHandle<'r>, InvalidHandler> {
        self.router.add_route(Method::POST, path.into(), handler.into())
    }

    /// Register a PUT route, moving the chain to the new route.
    pub fn put(
        self,
        path: impl Into<String>,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteHandle<'r>, InvalidHandler> {
        self.router.add_route(Method::PUT, path.into(), handler.into())
    }

    /// Register a DELETE route, moving the chain to the new route.
    pub fn delete(
        self,
        path: impl Into<String>,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteHandle<'r>, InvalidHandler> {
        self.router.add_route(Method::DELETE, path.into(), handler.into())
    }
}
