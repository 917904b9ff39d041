//! # Error Handling
//!
//! Centralized error types for the Trellis routing core.
//! Uses `thiserror` for ergonomic error definitions.
//!
//! Registration-time problems are hard errors and are returned to the caller
//! immediately. Request-time misses are never errors: they are reported as
//! [`Outcome`](crate::router::Outcome) values.

use crate::router::Method;
use thiserror::Error;

/// Result type alias for Trellis operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the Trellis runtime
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed path template supplied at registration time
    #[error("Invalid path template {template:?}: {reason}")]
    InvalidPathTemplate {
        /// The offending template
        template: String,
        /// Reason for invalidity
        reason: String,
    },

    /// The (method, template) pair is already registered
    #[error("Duplicate route: {method} {template}")]
    DuplicateRoute {
        /// HTTP method of the conflicting route
        method: Method,
        /// Template of the conflicting route
        template: String,
    },

    /// A route can never be reached because an earlier sibling accepts
    /// every value it would
    #[error("Ambiguous route: {method} {template} is shadowed by {shadowed_by}")]
    AmbiguousRoute {
        /// HTTP method of the unreachable route
        method: Method,
        /// Template of the unreachable route
        template: String,
        /// Template of the route that wins instead
        shadowed_by: String,
    },

    /// A route with the same name already exists
    #[error("Duplicate route name: {name}")]
    DuplicateRouteName {
        /// The conflicting name
        name: String,
    },

    /// Mutation attempted after the router was built
    #[error("Router is sealed: routes cannot be changed after build()")]
    RouterSealed,

    /// No route with the given name exists
    #[error("Unknown route: {name}")]
    UnknownRoute {
        /// The requested route name
        name: String,
    },

    /// A segment value does not satisfy its declared constraint
    #[error("Value {value:?} does not satisfy constraint {constraint}")]
    ConstraintViolation {
        /// The rejected raw value
        value: String,
        /// Source text of the constraint
        constraint: String,
    },

    /// Reverse routing received missing or invalid parameter values
    #[error("Invalid parameters for route {name}: {reason}")]
    InvalidParams {
        /// Route name
        name: String,
        /// What went wrong
        reason: String,
    },

    /// The transport received a method outside [`Method`]
    #[error("Method not implemented: {method}")]
    MethodNotImplemented {
        /// The method token as received
        method: String,
    },

    /// HTTP protocol error
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON body could not be parsed
    #[error("Invalid JSON body: {reason}")]
    InvalidJson {
        /// Parser message
        reason: String,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request payload too large
    #[error("Payload too large: limit={limit} bytes")]
    PayloadTooLarge {
        /// Max allowed size
        limit: usize,
        /// Size announced by `Content-Length`; `None` when a streamed body
        /// was cut off at the limit
        actual: Option<usize>,
    },
}

impl Error {
    /// Shorthand for building an [`Error::InvalidPathTemplate`]
    pub(crate) fn invalid_template(template: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPathTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error can only happen while routes are being registered
    #[must_use]
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPathTemplate { .. }
                | Self::DuplicateRoute { .. }
                | Self::AmbiguousRoute { .. }
                | Self::DuplicateRouteName { .. }
                | Self::RouterSealed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_template_error() {
        let err = Error::invalid_template("/users/{id", "unclosed parameter");
        assert!(err.to_string().contains("/users/{id"));
        assert!(err.to_string().contains("unclosed"));
        assert!(err.is_registration_error());
    }

    #[test]
    fn test_duplicate_route_error() {
        let err = Error::DuplicateRoute {
            method: Method::Get,
            template: "/about".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate route: GET /about");
    }

    #[test]
    fn test_unknown_route_is_not_registration_error() {
        let err = Error::UnknownRoute {
            name: "about_page".to_string(),
        };
        assert!(err.to_string().contains("about_page"));
        assert!(!err.is_registration_error());
    }
}
