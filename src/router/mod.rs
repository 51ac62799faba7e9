//! # Router Module
//!
//! The router module owns the route table: registration of `(path, method)` →
//! handler bindings with fluent attribute tagging, and exact-pair lookup for
//! the host's dispatcher.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Validating handler references at registration time (fail fast, no
//!   partial registration)
//! - Storing routes keyed by path and method, with replacement semantics for
//!   re-registered pairs
//! - Handing out [`RouteHandle`]s so attribute calls like `name` bind to the
//!   route that was just registered
//! - Exposing exact `(path, method)` lookup to downstream dispatch
//!
//! ## Registration flow
//!
//! ```rust
//! use gantry::registry::StaticTypeRegistry;
//! use gantry::router::Router;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), gantry::handler::InvalidHandler> {
//! let registry = StaticTypeRegistry::new().class("PetController", ["index", "show"]);
//! let mut router = Router::new(Arc::new(registry));
//!
//! router
//!     .get("/pets", "PetController@index")?
//!     .name("pets.index")
//!     .get("/pets/{id}", "PetController@show")?
//!     .name("pets.show");
//! # Ok(())
//! # }
//! ```
//!
//! ## What this module does not do
//!
//! Matching an incoming path against registered patterns, middleware
//! execution, and handler invocation all belong to the host's dispatcher.
//! The table only promises exact `(path, method)` lookup.
//!
//! ## Concurrency
//!
//! The table is meant to be populated once at startup by a single logical
//! thread and treated as read-only while requests are handled. A host that
//! must register concurrently wraps the whole `Router` in one lock; a
//! registration and the attribute calls chained onto its handle must appear
//! atomic together.

mod core;

pub use core::{Route, RouteHandle, Router};
