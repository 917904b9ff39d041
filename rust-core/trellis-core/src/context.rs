//! # Request Context
//!
//! Per-request state handed to every handler of a chain.
//!
//! A `Context` is created by [`Router::dispatch`](crate::router::Router::dispatch)
//! for exactly one request and dropped when the response is produced. It
//! owns the bound parameters, a free-form values bag, the response being
//! built and the chain cursor. Handlers steer the chain with [`Context::next`]
//! and [`Context::stop`]; returning without calling either stops the chain.

use crate::error::Result;
use crate::json::{parse_json_bytes, to_json};
use crate::request::Request;
use crate::response::Response;
use crate::router::Method;
use crate::types::ParamValue;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Bound path parameters in path order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Create an empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding
    pub fn push(&mut self, name: impl Into<String>, value: ParamValue) {
        self.entries.push((name.into(), value));
    }

    /// Get a typed parameter by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Get a parameter as text, whatever its type
    #[must_use]
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get(name).map(ToString::to_string)
    }

    /// Get a parameter as i64 (convenience method)
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_int)
    }

    /// Get a parameter as u64 (convenience method)
    #[must_use]
    pub fn get_uint(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(ParamValue::as_uint)
    }

    /// Get a parameter as bool (convenience method)
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ParamValue::as_bool)
    }

    /// Number of bound parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// Why a chain stopped running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A handler called [`Context::stop`] or [`Context::stop_with_status`]
    Explicit,
    /// A handler returned without calling `next()` or `stop()`
    Implicit,
    /// Every handler ran and asked to continue
    Exhausted,
    /// The request was cancelled before the next handler
    Cancelled,
    /// A handler panicked
    Panicked,
}

/// Per-request context
#[derive(Debug)]
pub struct Context {
    request: Request,
    response: Response,
    params: Params,
    values: HashMap<String, serde_json::Value>,
    route_name: Option<String>,
    suggestions: Vec<String>,
    allowed_methods: Vec<Method>,
    cancel: CancellationToken,
    cursor: usize,
    continue_requested: bool,
    stop_reason: Option<StopReason>,
}

impl Context {
    /// Create a context for one request
    #[must_use]
    pub fn new(request: Request, cancel: CancellationToken) -> Self {
        Self {
            request,
            response: Response::default(),
            params: Params::new(),
            values: HashMap::new(),
            route_name: None,
            suggestions: Vec::new(),
            allowed_methods: Vec::new(),
            cancel,
            cursor: 0,
            continue_requested: false,
            stop_reason: None,
        }
    }

    /// The inbound request
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Mutable access to the inbound request
    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// The response being built
    #[must_use]
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Mutable access to the response being built
    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// Bound path parameters
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Shorthand for `params().get(name)`
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Name of the matched route, if it has one
    #[must_use]
    pub fn route_name(&self) -> Option<&str> {
        self.route_name.as_deref()
    }

    /// Closest registered paths (only set on 404)
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Methods registered for the path (only set on 405)
    #[must_use]
    pub fn allowed_methods(&self) -> &[Method] {
        &self.allowed_methods
    }

    /// Store a value for later handlers of the same request
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the value cannot be represented as JSON.
    pub fn set_value<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        self.values.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Read a value stored by an earlier handler
    ///
    /// Returns `None` if the key is missing or has a different shape.
    #[must_use]
    pub fn value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Parse the request body as JSON
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidJson` if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let mut bytes = self.request.body_bytes().to_vec();
        parse_json_bytes(&mut bytes)
    }

    /// Set the response status code
    pub fn set_status(&mut self, status: u16) {
        self.response.status = status;
    }

    /// Current response status code
    #[must_use]
    pub fn status(&self) -> u16 {
        self.response.status
    }

    /// Write a plain-text body
    pub fn text(&mut self, body: impl Into<String>) {
        self.response.body = body.into();
        self.response.content_type = "text/plain".to_string();
    }

    /// Serialize `value` as the JSON body
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails; the response is left
    /// untouched in that case.
    pub fn write_json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        self.response.body = to_json(value)?;
        self.response.content_type = "application/json".to_string();
        Ok(())
    }

    /// Continue with the next handler once this one returns
    ///
    /// Calling it from the last handler is a no-op.
    pub fn next(&mut self) {
        self.continue_requested = true;
    }

    /// Stop the chain after this handler returns
    pub fn stop(&mut self) {
        self.stop_reason = Some(StopReason::Explicit);
    }

    /// Set `status` and stop; statuses >= 400 fire the error-code handlers
    pub fn stop_with_status(&mut self, status: u16) {
        self.set_status(status);
        self.stop();
    }

    /// Whether the chain has been stopped
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stop_reason.is_some()
    }

    /// Why the last chain run ended
    #[must_use]
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Index of the handler currently running
    #[must_use]
    pub fn handler_index(&self) -> usize {
        self.cursor
    }

    /// The request's cancellation token
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether the transport cancelled the request
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Consume the context and return the response
    #[must_use]
    pub fn into_response(self) -> Response {
        self.response
    }

    pub(crate) fn bind(&mut self, params: Params, route_name: Option<String>) {
        self.params = params;
        self.route_name = route_name;
    }

    pub(crate) fn set_suggestions(&mut self, suggestions: Vec<String>) {
        self.suggestions = suggestions;
    }

    pub(crate) fn set_allowed_methods(&mut self, allowed: Vec<Method>) {
        self.allowed_methods = allowed;
    }

    // Chain driver hooks, used by `Chain::run`.

    pub(crate) fn begin_chain(&mut self) {
        self.cursor = 0;
        self.continue_requested = false;
        self.stop_reason = None;
    }

    pub(crate) fn begin_handler(&mut self) {
        self.continue_requested = false;
    }

    pub(crate) fn continue_requested(&self) -> bool {
        self.continue_requested
    }

    pub(crate) fn advance(&mut self) {
        self.cursor += 1;
    }

    pub(crate) fn finish(&mut self, reason: StopReason) {
        if self.stop_reason.is_none() || reason == StopReason::Panicked {
            self.stop_reason = Some(reason);
        }
    }
}
