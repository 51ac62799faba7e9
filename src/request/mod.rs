//! # Request Module
//!
//! The request module turns raw transport data into a canonical [`Request`]
//! value: one call to [`normalize`] per incoming transport event.
//!
//! ## Overview
//!
//! The normalizer is responsible for:
//! - Deriving scheme, host, and port from forwarded-host and TLS variables
//! - Splitting the raw request URI into the script's base URL and the
//!   application-relative path
//! - Decoding the request body by content type (JSON passthrough, XML
//!   converted to JSON, query parameters for GET)
//!
//! ## Inputs
//!
//! The [`TransportContext`] is a read-only map of CGI-style variables
//! (`REQUEST_METHOD`, `REQUEST_URI`, `SCRIPT_NAME`, `HTTP_HOST`, ...) supplied
//! by the hosting environment; the key names are exported as [`keys`]. The
//! body arrives as any [`std::io::Read`] value and is consumed exactly once —
//! the stream is not re-readable afterward.
//!
//! ## Statelessness
//!
//! `normalize` is a pure, single-pass transformation. It holds no state
//! across calls; two calls on two raw inputs yield two independent requests.
//! The resulting [`Request`] lives for one transport event and is read-only
//! apart from `path` and `attributes`, which a dispatcher may rewrite (for
//! example after stripping a matched prefix).

mod core;
mod xml;

pub use core::{keys, normalize, NormalizeError, Request, TransportContext};
