//! # Route Metadata
//!
//! A registered route: its template, its handlers and the middleware that
//! was in scope when it was registered.
//!
//! ## Design Principles
//!
//! - **S**: `Route` only holds information about a single route definition
//! - **O**: Free-form metadata instead of ever-growing fields
//! - **D**: Matching lives in the trie; a route never looks itself up

use crate::middleware::{Chain, HandlerRef};
use crate::router::Method;
use crate::template::PathTemplate;
use crate::trie::RouteId;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Handle returned by registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteHandle {
    pub(crate) id: RouteId,
    pub(crate) method: Method,
}

impl RouteHandle {
    /// Route id
    #[must_use]
    pub fn id(&self) -> RouteId {
        self.id
    }

    /// HTTP method of the route
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }
}

impl fmt::Display for RouteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.method, self.id)
    }
}

/// Route definition
pub struct Route {
    pub(crate) id: RouteId,
    pub(crate) method: Method,
    pub(crate) template: PathTemplate,
    pub(crate) name: Option<String>,
    /// Route-own handlers
    pub(crate) handlers: Vec<HandlerRef>,
    /// Router and group middleware in scope at registration
    pub(crate) middleware: Vec<HandlerRef>,
    /// Router and group `done` handlers in scope at registration
    pub(crate) done: Vec<HandlerRef>,
    pub(crate) metadata: HashMap<String, Value>,
    /// Composed at build
    pub(crate) chain: Option<Chain>,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("template", &self.template.as_str())
            .field("name", &self.name)
            .field("handlers", &self.handlers.len())
            .field("middleware", &self.middleware.len())
            .field("done", &self.done.len())
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl Route {
    /// Handle of this route
    #[must_use]
    pub fn handle(&self) -> RouteHandle {
        RouteHandle {
            id: self.id,
            method: self.method,
        }
    }

    /// HTTP method
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Template text as registered (prefix included)
    #[must_use]
    pub fn template(&self) -> &str {
        self.template.as_str()
    }

    /// Parsed template
    #[must_use]
    pub fn path_template(&self) -> &PathTemplate {
        &self.template
    }

    /// Route name, if any
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Metadata attached with `Router::set_metadata`
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Number of route-own handlers
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Compose the full chain: global, scoped middleware, handlers, done
    pub(crate) fn compose(&self, global: &[HandlerRef], done_global: &[HandlerRef]) -> Chain {
        Chain::compose(&[
            global,
            &self.middleware,
            &self.handlers,
            &self.done,
            done_global,
        ])
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.template)?;
        if let Some(name) = &self.name {
            write!(f, " ({name})")?;
        }
        Ok(())
    }
}
