//! # Trellis Core
//!
//! Request routing and middleware dispatch for HTTP services.
//!
//! ## Architecture
//!
//! Routes are registered on a [`Router`] while it is being built, then the
//! router is sealed with [`Router::build`] and shared behind an `Arc` for
//! lock-free concurrent lookups. Each request gets its own [`Context`] and
//! walks a precomposed handler [`Chain`].
//!
//! ## Modules
//!
//! - `types` - Parameter types, rule functions and typed values
//! - `template` - Path template grammar
//! - `trie` - Segment trie with per-method terminals
//! - `route` - Route metadata and handles
//! - `router` - Registration, resolution, dispatch, reverse routing
//! - `group` - Prefix and middleware scoped registration
//! - `context` - Per-request state and chain cursor
//! - `middleware` - Handler trait, chains and built-in middleware
//! - `request` / `response` - Transport-neutral HTTP types
//! - `server` - hyper service adapter
//! - `json` - simd-json parsing, serde_json serialization
//! - `config` - Router configuration
//! - `telemetry` - tracing subscriber setup
//! - `error` - Error types and handling

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

/// Expands to one `fn verb(&mut self, template, handlers)` per HTTP method,
/// delegating to `self.handle`
macro_rules! verb_helpers {
    ($($(#[$doc:meta])* $fn_name:ident => $method:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            ///
            /// # Errors
            ///
            /// See [`Router::register`](crate::router::Router::register).
            pub fn $fn_name(
                &mut self,
                template: &str,
                handlers: Vec<HandlerRef>,
            ) -> Result<RouteHandle> {
                self.handle(Method::$method, template, handlers)
            }
        )*
    };
}

pub mod config;
pub mod context;
pub mod error;
pub mod group;
pub mod json;
pub mod middleware;
pub mod request;
pub mod response;
pub mod route;
pub mod router;
pub mod server;
pub mod telemetry;
pub mod template;
pub mod trie;
pub mod types;

pub use config::RouterConfig;
pub use context::{Context, Params, StopReason};
pub use error::{Error, Result};
pub use group::Group;
pub use json::{parse_json, to_json};
pub use middleware::{handler, Chain, Cors, Handler, HandlerRef, RateLimit, RequestId, RequestLogger};
pub use request::Request;
pub use response::Response;
pub use route::{Route, RouteHandle};
pub use router::{Method, Outcome, ResolvedRoute, Router};
pub use server::{serve_connection, RouterService};
pub use template::PathTemplate;
pub use types::{ParamType, ParamTypes, ParamValue};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
