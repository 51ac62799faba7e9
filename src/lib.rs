//! # Gantry
//!
//! **Gantry** is a minimal web-handling toolkit: fluent HTTP route
//! registration with registration-time handler validation, and normalization
//! of raw transport data into a canonical request value.
//!
//! ## Architecture
//!
//! The library is organized into four modules:
//!
//! - **[`registry`]** - Capability queries against the host's type system
//!   (`has_class` / `has_method` / `is_invocable`)
//! - **[`handler`]** - Handler references (`"Class@method"` strings or
//!   closures) and their registration-time validation
//! - **[`router`]** - The route table: fluent registration, attribute
//!   tagging through pending-route handles, exact `(path, method)` lookup
//! - **[`request`]** - The request normalizer: scheme/host/port derivation,
//!   base-URL/path splitting, content-type-driven body decoding
//!
//! Control flow: a caller populates a [`Router`] at startup; independently,
//! on each incoming transport event, [`request::normalize`] produces a
//! [`Request`] which the host's dispatcher matches against the table and
//! hands to the resolved handler. Dispatching itself — pattern matching,
//! middleware, invocation, response writing — is the host's job, not this
//! crate's.
//!
//! ## Quick Start
//!
//! ```rust
//! use gantry::registry::StaticTypeRegistry;
//! use gantry::request::{self, keys, TransportContext};
//! use gantry::router::Router;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Build time: register routes against the host's callable surface.
//! let registry = StaticTypeRegistry::new().class("PetController", ["index"]);
//! let mut router = Router::new(Arc::new(registry));
//! router.get("/pets", "PetController@index")?.name("pets.index");
//!
//! // Per transport event: normalize the raw context into a Request.
//! let ctx: TransportContext = [
//!     (keys::REQUEST_METHOD, "GET"),
//!     (keys::REQUEST_URI, "/index.php/pets?limit=10"),
//!     (keys::SCRIPT_NAME, "/index.php"),
//!     (keys::HTTP_HOST, "pets.example"),
//! ]
//! .into_iter()
//! .collect();
//! let request = request::normalize(&ctx, std::io::empty())?;
//!
//! assert_eq!(request.path(), "/pets");
//! assert!(router.route(request.method(), request.path()).is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All failures are synchronous and surfaced to the immediate caller:
//! [`InvalidHandler`] at registration time, [`NormalizeError`] per transport
//! event. Nothing is retried internally, and mapping failures to HTTP status
//! codes belongs to the host.
//!
//! ## Logging
//!
//! The crate emits structured [`tracing`] events (route registration and
//! lookup, URI derivation, body reads); installing a subscriber is up to the
//! host.

pub mod handler;
pub mod registry;
pub mod request;
pub mod router;

pub use handler::{HandlerFn, HandlerRef, InvalidHandler, ResolvedHandler};
pub use registry::{StaticTypeRegistry, TypeRegistry};
pub use request::{normalize, NormalizeError, Request, TransportContext};
pub use router::{Route, RouteHandle, Router};
