//! # Router Configuration
//!
//! Plain configuration struct. It derives serde so callers can load it from
//! whatever source they like; no file parsing happens here.

use serde::{Deserialize, Serialize};

/// Default maximum request body size (1 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Router behaviour switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Replace an existing (method, template) route instead of failing
    pub allow_override: bool,
    /// Answer 405 when the path exists under another method (404 otherwise)
    pub fire_method_not_allowed: bool,
    /// Maximum number of suggestions attached to a 404
    pub suggestion_limit: usize,
    /// Maximum edit distance for suggestions; `None` picks `max(2, len / 2)`
    pub max_suggestion_distance: Option<usize>,
    /// Collapse `//` and strip a trailing `/` from request paths
    pub path_correction: bool,
    /// Percent-decode bound parameter values
    pub decode_params: bool,
    /// Largest request body the transport will collect
    pub max_body_size: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            allow_override: false,
            fire_method_not_allowed: true,
            suggestion_limit: 3,
            max_suggestion_distance: None,
            path_correction: true,
            decode_params: true,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl RouterConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `allow_override`
    #[must_use]
    pub const fn allow_override(mut self, on: bool) -> Self {
        self.allow_override = on;
        self
    }

    /// Set `fire_method_not_allowed`
    #[must_use]
    pub const fn fire_method_not_allowed(mut self, on: bool) -> Self {
        self.fire_method_not_allowed = on;
        self
    }

    /// Set `suggestion_limit` (0 disables suggestions)
    #[must_use]
    pub const fn suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit;
        self
    }

    /// Set `max_suggestion_distance`
    #[must_use]
    pub const fn max_suggestion_distance(mut self, distance: Option<usize>) -> Self {
        self.max_suggestion_distance = distance;
        self
    }

    /// Set `path_correction`
    #[must_use]
    pub const fn path_correction(mut self, on: bool) -> Self {
        self.path_correction = on;
        self
    }

    /// Set `decode_params`
    #[must_use]
    pub const fn decode_params(mut self, on: bool) -> Self {
        self.decode_params = on;
        self
    }

    /// Set `max_body_size`
    #[must_use]
    pub const fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }
}
