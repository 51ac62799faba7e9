//! Capability queries against the host's type system.
//!
//! Handler references like `"PetController@show"` name code the host owns, not
//! this crate. The validator never inspects runtime metadata directly; it asks
//! the host through [`TypeRegistry`], and the host answers from whatever it
//! actually has (a handler table, generated registrations, a plugin index).
//!
//! [`StaticTypeRegistry`] is the map-backed implementation most hosts want:
//! declare classes and their methods up front, hand the registry to the
//! router, done.

use std::collections::{HashMap, HashSet};

/// Method name that marks a class as directly invocable when a handler
/// reference carries no explicit method segment.
pub const INVOKE_METHOD: &str = "invoke";

/// Read-only oracle over the host's callable surface.
///
/// Implementations must be pure lookups: the validator may call these in any
/// order, any number of times, and expects consistent answers for the
/// lifetime of the router holding the registry.
pub trait TypeRegistry {
    /// Whether `class` names a known class.
    fn has_class(&self, class: &str) -> bool;

    /// Whether `method` exists on `class`.
    fn has_method(&self, class: &str, method: &str) -> bool;

    /// Whether `class` can be called without naming a method.
    ///
    /// The default treats a class as invocable when it exposes an
    /// [`INVOKE_METHOD`] method.
    fn is_invocable(&self, class: &str) -> bool {
        self.has_method(class, INVOKE_METHOD)
    }
}

/// Map-backed [`TypeRegistry`] for hosts without runtime reflection.
///
/// # Example
///
/// ```
/// use gantry::registry::StaticTypeRegistry;
///
/// let registry = StaticTypeRegistry::new()
///     .class("PetController", ["index", "show"])
///     .invocable_class("HealthCheck");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticTypeRegistry {
    classes: HashMap<String, HashSet<String>>,
}

impl StaticTypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a class and the methods callable on it.
    #[must_use]
    pub fn class<I, S>(mut self, class: impl Into<String>, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.classes.entry(class.into()).or_default();
        entry.extend(methods.into_iter().map(Into::into));
        self
    }

    /// Declare a class callable without a method segment.
    #[must_use]
    pub fn invocable_class(self, class: impl Into<String>) -> Self {
        self.class(class, [INVOKE_METHOD])
    }
}

impl TypeRegistry for StaticTypeRegistry {
    fn has_class(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    fn has_method(&self, class: &str, method: &str) -> bool {
        self.classes.get(class).is_some_and(|m| m.contains(method))
    }
}
