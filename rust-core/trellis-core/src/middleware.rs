//! # Middleware Chain
//!
//! Handlers, handler chains and the built-in middleware.
//!
//! A chain is an ordered, read-only list of handlers. It is driven by an
//! index cursor stored in the [`Context`]: a handler runs to completion, and
//! the driver moves to the next one only if the handler called
//! [`Context::next`]. Anything else ends the run. Panics are caught at this
//! boundary and turned into a 500.

use crate::context::{Context, StopReason};
use crate::router::Method;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info};

/// Request handler
///
/// Any `Fn(&mut Context) + Send + Sync` closure is a handler.
pub trait Handler: Send + Sync {
    /// Process the request; call `ctx.next()` to continue the chain
    fn handle(&self, ctx: &mut Context);

    /// Handler name for logging
    fn name(&self) -> &'static str {
        "handler"
    }
}

impl<F> Handler for F
where
    F: Fn(&mut Context) + Send + Sync,
{
    fn handle(&self, ctx: &mut Context) {
        self(ctx);
    }
}

/// Shared handler reference
pub type HandlerRef = Arc<dyn Handler>;

/// Wrap a handler into a [`HandlerRef`]
pub fn handler<H: Handler + 'static>(h: H) -> HandlerRef {
    Arc::new(h)
}

/// Immutable, cheaply clonable handler sequence
#[derive(Clone)]
pub struct Chain {
    handlers: Arc<[HandlerRef]>,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|h| h.name()))
            .finish()
    }
}

impl Chain {
    /// Build a chain from handlers in execution order
    #[must_use]
    pub fn new(handlers: Vec<HandlerRef>) -> Self {
        Self {
            handlers: handlers.into(),
        }
    }

    /// Concatenate several handler lists into one chain
    #[must_use]
    pub fn compose(parts: &[&[HandlerRef]]) -> Self {
        let handlers: Vec<HandlerRef> = parts.iter().flat_map(|p| p.iter().cloned()).collect();
        Self::new(handlers)
    }

    /// A new chain with `handler` appended
    #[must_use]
    pub fn with(&self, handler: HandlerRef) -> Self {
        Self::compose(&[&self.handlers, std::slice::from_ref(&handler)])
    }

    /// Get the number of handlers
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if chain is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the chain against `ctx`
    ///
    /// Cancellation is checked before every handler. The reason the run
    /// ended is recorded in [`Context::stop_reason`].
    pub fn run(&self, ctx: &mut Context) -> StopReason {
        ctx.begin_chain();

        loop {
            if ctx.is_stopped() {
                break;
            }
            let Some(handler) = self.handlers.get(ctx.handler_index()) else {
                ctx.finish(StopReason::Exhausted);
                break;
            };
            if ctx.is_cancelled() {
                debug!(
                    path = %ctx.request().path,
                    handler_index = ctx.handler_index(),
                    "Request cancelled, skipping remaining handlers"
                );
                ctx.finish(StopReason::Cancelled);
                break;
            }

            ctx.begin_handler();
            let result = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(ctx)));

            if let Err(payload) = result {
                error!(
                    method = %ctx.request().method,
                    path = %ctx.request().path,
                    handler = handler.name(),
                    panic = %panic_message(payload.as_ref()),
                    "Handler panicked"
                );
                ctx.set_status(500);
                ctx.finish(StopReason::Panicked);
                break;
            }
            if ctx.is_stopped() {
                break;
            }
            if !ctx.continue_requested() {
                ctx.finish(StopReason::Implicit);
                break;
            }
            ctx.advance();
        }

        ctx.stop_reason().unwrap_or(StopReason::Exhausted)
    }
}

/// Extract a readable message from a panic payload
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Access-log middleware - logs requests in structured form
#[derive(Default)]
pub struct RequestLogger {
    log_headers: bool,
}

impl RequestLogger {
    /// Create a new request logger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable header logging
    #[must_use]
    pub fn with_headers(mut self) -> Self {
        self.log_headers = true;
        self
    }
}

impl Handler for RequestLogger {
    fn handle(&self, ctx: &mut Context) {
        let req = ctx.request();
        let request_id = req.header("x-request-id").unwrap_or("-");
        if self.log_headers {
            info!(
                method = %req.method,
                path = %req.path,
                route = ctx.route_name().unwrap_or("-"),
                request_id = %request_id,
                headers = ?req.headers_map(),
                "Request received"
            );
        } else {
            info!(
                method = %req.method,
                path = %req.path,
                route = ctx.route_name().unwrap_or("-"),
                request_id = %request_id,
                "Request received"
            );
        }
        ctx.next();
    }

    fn name(&self) -> &'static str {
        "RequestLogger"
    }
}

/// Ensures every request and response carries an `x-request-id` header
#[derive(Default)]
pub struct RequestId;

impl RequestId {
    /// Create a new request-id middleware
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Handler for RequestId {
    fn handle(&self, ctx: &mut Context) {
        let id = match ctx.request().header("x-request-id") {
            Some(id) => id.to_string(),
            None => {
                let id = generate_request_id();
                ctx.request_mut().set_header("x-request-id", &id);
                id
            }
        };
        ctx.response_mut().set_header("x-request-id", &id);
        ctx.next();
    }

    fn name(&self) -> &'static str {
        "RequestId"
    }
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(1);

fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:x}", now.as_nanos(), counter)
}

/// CORS middleware - adds Cross-Origin Resource Sharing headers
///
/// Preflight (`OPTIONS`) requests are answered with 204 and the chain stops.
#[derive(Clone)]
pub struct Cors {
    allow_origin: String,
    allow_methods: String,
    allow_headers: String,
}

impl Default for Cors {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: "GET, POST, PUT, DELETE, PATCH, OPTIONS".to_string(),
            allow_headers: "Content-Type, Authorization".to_string(),
        }
    }
}

impl Cors {
    /// Create a new CORS middleware with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set allowed origin
    #[must_use]
    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.allow_origin = origin.into();
        self
    }

    /// Set allowed methods
    #[must_use]
    pub fn allow_methods(mut self, methods: impl Into<String>) -> Self {
        self.allow_methods = methods.into();
        self
    }

    /// Set allowed headers
    #[must_use]
    pub fn allow_headers(mut self, headers: impl Into<String>) -> Self {
        self.allow_headers = headers.into();
        self
    }

    /// Get the Access-Control-Allow-Origin header value
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.allow_origin
    }
}

impl Handler for Cors {
    fn handle(&self, ctx: &mut Context) {
        let res = ctx.response_mut();
        res.set_header("Access-Control-Allow-Origin", &self.allow_origin);
        res.set_header("Access-Control-Allow-Methods", &self.allow_methods);
        res.set_header("Access-Control-Allow-Headers", &self.allow_headers);

        if ctx.request().method == Method::Options {
            ctx.set_status(204);
            ctx.stop();
        } else {
            ctx.next();
        }
    }

    fn name(&self) -> &'static str {
        "Cors"
    }
}

/// Default number of tracked keys before idle buckets are pruned
pub const DEFAULT_RATE_LIMIT_KEYS: usize = 10_000;

/// Token bucket rate limiting middleware
///
/// Buckets are keyed by the `x-client-ip` header set by the transport. Once
/// `max_keys` buckets are tracked, a new key first drops every bucket that
/// has refilled to capacity, since such a bucket is the same as a fresh one.
pub struct RateLimit {
    /// Maximum burst capacity
    capacity: u64,
    /// Tokens refilled per second
    refill_per_sec: u64,
    max_keys: usize,
    /// Per-key buckets
    state: Mutex<HashMap<String, Bucket>>,
}

/// Internal token bucket state
struct Bucket {
    tokens: u64,
    last_refill: Instant,
}

impl RateLimit {
    /// Create a new rate limiter
    #[must_use]
    pub fn new(capacity: u64, refill_per_sec: u64) -> Self {
        Self {
            capacity,
            refill_per_sec,
            max_keys: DEFAULT_RATE_LIMIT_KEYS,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Set the number of tracked keys that triggers pruning
    #[must_use]
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }

    /// Number of buckets currently tracked
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn refill(&self, bucket: &Bucket, now: Instant) -> u64 {
        let elapsed = now.duration_since(bucket.last_refill);
        (elapsed.as_secs_f64() * self.refill_per_sec as f64) as u64
    }

    fn allow(&self, key: &str) -> bool {
        let mut map = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        if map.len() >= self.max_keys && !map.contains_key(key) {
            let before = map.len();
            map.retain(|_, b| b.tokens.saturating_add(self.refill(b, now)) < self.capacity);
            debug!(pruned = before - map.len(), remaining = map.len(), "Rate limit buckets pruned");
        }
        let bucket = map.entry(key.to_string()).or_insert(Bucket {
            tokens: self.capacity,
            last_refill: now,
        });
        let refill = self.refill(bucket, now);
        if refill > 0 {
            bucket.tokens = bucket.tokens.saturating_add(refill).min(self.capacity);
            bucket.last_refill = now;
        }
        if bucket.tokens == 0 {
            return false;
        }
        bucket.tokens -= 1;
        true
    }
}

impl Handler for RateLimit {
    fn handle(&self, ctx: &mut Context) {
        let key = ctx
            .request()
            .header("x-client-ip")
            .unwrap_or("unknown")
            .to_string();
        if self.allow(&key) {
            ctx.next();
        } else {
            ctx.response_mut().body = r#"{"error":"Rate limit exceeded"}"#.to_string();
            ctx.response_mut().content_type = "application/json".to_string();
            ctx.stop_with_status(429);
        }
    }

    fn name(&self) -> &'static str {
        "RateLimit"
    }
}
