//! # Router
//!
//! Route registration, resolution and dispatch.
//!
//! ## Lifecycle
//!
//! A router starts in the **Building** phase: routes, groups, middleware and
//! error-code handlers are registered through `&mut self`. [`Router::build`]
//! validates the table, composes every chain once and moves the router into
//! the **Serving** phase, after which it is meant to be shared as
//! `Arc<Router>`. Every mutation attempted while serving fails with
//! [`Error::RouterSealed`].
//!
//! ## Resolution
//!
//! Lookups never fail with an error: a miss is an [`Outcome`]. A path that
//! exists under another method is reported as `MethodNotAllowed` (unless
//! disabled in [`RouterConfig`]); anything else is `NotFound`, carrying the
//! closest static paths as suggestions.

use crate::config::RouterConfig;
use crate::context::{Context, Params, StopReason};
use crate::error::{Error, Result};
use crate::group::Group;
use crate::middleware::{Chain, HandlerRef};
use crate::request::{percent_decode, percent_encode, Request};
use crate::response::Response;
use crate::route::{Route, RouteHandle};
use crate::template::{correct_path, PathTemplate, Segment};
use crate::trie::{closest_paths, Lookup, RawParam, RouteId, Trie};
use crate::types::{ParamTypes, ParamValue};
use serde_json::{json, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// HTTP methods supported by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    /// HTTP GET
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP DELETE
    Delete,
    /// HTTP PATCH
    Patch,
    /// HTTP HEAD
    Head,
    /// HTTP OPTIONS
    Options,
    /// HTTP CONNECT
    Connect,
    /// HTTP TRACE
    Trace,
}

impl Method {
    /// Every supported method, in `Ord` order
    pub const ALL: [Self; 9] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Patch,
        Self::Head,
        Self::Options,
        Self::Connect,
        Self::Trace,
    ];

    /// Upper-case method token
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Connect => "CONNECT",
            Self::Trace => "TRACE",
        }
    }

    /// Convert a hyper method; extension methods yield `None`
    #[must_use]
    pub fn from_hyper(method: &hyper::Method) -> Option<Self> {
        Some(match *method {
            hyper::Method::GET => Self::Get,
            hyper::Method::POST => Self::Post,
            hyper::Method::PUT => Self::Put,
            hyper::Method::DELETE => Self::Delete,
            hyper::Method::PATCH => Self::Patch,
            hyper::Method::HEAD => Self::Head,
            hyper::Method::OPTIONS => Self::Options,
            hyper::Method::CONNECT => Self::Connect,
            hyper::Method::TRACE => Self::Trace,
            _ => return None,
        })
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::MethodNotImplemented {
                method: s.to_string(),
            })
    }
}

/// A successful resolution
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    /// Matched route id
    pub route_id: RouteId,
    /// Matched route name
    pub name: Option<String>,
    /// Full handler chain
    pub chain: Chain,
    /// Bound parameters in path order
    pub params: Params,
}

/// Result of [`Router::resolve`]
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A route matched
    Matched(ResolvedRoute),
    /// Nothing matched
    NotFound {
        /// Closest registered static paths
        suggestions: Vec<String>,
    },
    /// The path exists, but not for this method
    MethodNotAllowed {
        /// Methods registered for the path, sorted
        allowed: Vec<Method>,
    },
}

impl Outcome {
    /// HTTP status this outcome maps to before any handler runs
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Matched(_) => 200,
            Self::NotFound { .. } => 404,
            Self::MethodNotAllowed { .. } => 405,
        }
    }
}

/// Route table, trie and middleware registry
pub struct Router {
    config: RouterConfig,
    param_types: ParamTypes,
    trie: Trie,
    /// Slab indexed by `RouteId`; removed routes leave `None`
    routes: Vec<Option<Route>>,
    names: HashMap<String, RouteId>,
    /// Snapshotted into routes registered after the call
    middleware: Vec<HandlerRef>,
    done: Vec<HandlerRef>,
    /// Applied to every route at composition time
    global: Vec<HandlerRef>,
    done_global: Vec<HandlerRef>,
    error_handlers: HashMap<u16, Chain>,
    /// Cached by `build()`
    global_chain: Chain,
    static_paths: Vec<String>,
    sealed: bool,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("config", &self.config)
            .field("routes", &self.len())
            .field("error_handlers", &self.error_handlers.keys())
            .field("sealed", &self.sealed)
            .finish_non_exhaustive()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a new empty router with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create a new empty router
    #[must_use]
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            config,
            param_types: ParamTypes::new(),
            trie: Trie::new(),
            routes: Vec::new(),
            names: HashMap::new(),
            middleware: Vec::new(),
            done: Vec::new(),
            global: Vec::new(),
            done_global: Vec::new(),
            error_handlers: HashMap::new(),
            global_chain: Chain::default(),
            static_paths: Vec::new(),
            sealed: false,
        }
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Registered custom parameter types
    #[must_use]
    pub fn param_types(&self) -> &ParamTypes {
        &self.param_types
    }

    /// Register a custom parameter type usable as `{name:type_name}`
    ///
    /// # Errors
    ///
    /// Returns `Error::RouterSealed` after `build()`.
    pub fn register_param_type<F>(&mut self, type_name: &str, predicate: F) -> Result<()>
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.ensure_building()?;
        self.param_types.register(type_name, predicate);
        Ok(())
    }

    /// Register a route
    ///
    /// Router middleware and `done` handlers in effect now are captured into
    /// the route; later `use_middleware` calls do not affect it.
    ///
    /// # Errors
    ///
    /// - `Error::RouterSealed` after `build()`
    /// - `Error::InvalidPathTemplate` for a malformed template
    /// - `Error::DuplicateRouteName` if `name` is taken
    /// - `Error::DuplicateRoute` if (method, template) is taken and
    ///   overriding is disabled
    pub fn register(
        &mut self,
        method: Method,
        template: &str,
        name: Option<&str>,
        handlers: Vec<HandlerRef>,
    ) -> Result<RouteHandle> {
        self.register_scoped(method, template, name, handlers, &[], &[])
    }

    /// Register an unnamed route
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn handle(
        &mut self,
        method: Method,
        template: &str,
        handlers: Vec<HandlerRef>,
    ) -> Result<RouteHandle> {
        self.register(method, template, None, handlers)
    }

    /// Register a named route
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn handle_named(
        &mut self,
        method: Method,
        template: &str,
        name: &str,
        handlers: Vec<HandlerRef>,
    ) -> Result<RouteHandle> {
        self.register(method, template, Some(name), handlers)
    }

    verb_helpers! {
        /// Register a GET route
        get => Get,
        /// Register a POST route
        post => Post,
        /// Register a PUT route
        put => Put,
        /// Register a DELETE route
        delete => Delete,
        /// Register a PATCH route
        patch => Patch,
        /// Register a HEAD route
        head => Head,
        /// Register an OPTIONS route
        options => Options,
        /// Register a CONNECT route
        connect => Connect,
        /// Register a TRACE route
        trace => Trace,
    }

    /// Register the same handlers for every method
    ///
    /// Either all nine routes are registered or none is.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn any(&mut self, template: &str, handlers: Vec<HandlerRef>) -> Result<Vec<RouteHandle>> {
        self.any_scoped(template, handlers, &[], &[])
    }

    /// Open a route group under `prefix`
    ///
    /// `middleware` runs for every route registered through the group, after
    /// router middleware and before the route's own handlers.
    pub fn group(&mut self, prefix: &str, middleware: Vec<HandlerRef>) -> Group<'_> {
        Group::new(self, prefix, middleware)
    }

    /// Add middleware for routes registered from now on
    ///
    /// # Errors
    ///
    /// Returns `Error::RouterSealed` after `build()`.
    pub fn use_middleware(&mut self, handler: HandlerRef) -> Result<()> {
        self.ensure_building()?;
        self.middleware.push(handler);
        Ok(())
    }

    /// Add middleware that runs first for every route, including routes
    /// registered before this call
    ///
    /// # Errors
    ///
    /// Returns `Error::RouterSealed` after `build()`.
    pub fn use_global(&mut self, handler: HandlerRef) -> Result<()> {
        self.ensure_building()?;
        self.global.push(handler);
        Ok(())
    }

    /// Add a handler that runs after the route handlers of routes registered
    /// from now on (the route handler must call `next()`)
    ///
    /// # Errors
    ///
    /// Returns `Error::RouterSealed` after `build()`.
    pub fn done(&mut self, handler: HandlerRef) -> Result<()> {
        self.ensure_building()?;
        self.done.push(handler);
        Ok(())
    }

    /// Add a handler that runs last for every route
    ///
    /// # Errors
    ///
    /// Returns `Error::RouterSealed` after `build()`.
    pub fn done_global(&mut self, handler: HandlerRef) -> Result<()> {
        self.ensure_building()?;
        self.done_global.push(handler);
        Ok(())
    }

    /// Append a handler to the chain fired for status `code`
    ///
    /// # Errors
    ///
    /// Returns `Error::RouterSealed` after `build()`.
    pub fn on_error_code(&mut self, code: u16, handler: HandlerRef) -> Result<()> {
        self.ensure_building()?;
        let chain = self.error_handlers.entry(code).or_default();
        *chain = chain.with(handler);
        debug!(code, handlers = chain.len(), "Error handler registered");
        Ok(())
    }

    /// Attach a metadata value to a route
    ///
    /// # Errors
    ///
    /// - `Error::RouterSealed` after `build()`
    /// - `Error::UnknownRoute` if the handle no longer refers to a route
    pub fn set_metadata(&mut self, handle: RouteHandle, key: &str, value: Value) -> Result<()> {
        self.ensure_building()?;
        let route = self
            .routes
            .get_mut(handle.id)
            .and_then(Option::as_mut)
            .filter(|r| r.method == handle.method)
            .ok_or_else(|| Error::UnknownRoute {
                name: handle.to_string(),
            })?;
        route.metadata.insert(key.to_string(), value);
        Ok(())
    }

    /// Remove a named route
    ///
    /// # Errors
    ///
    /// - `Error::RouterSealed` after `build()`
    /// - `Error::UnknownRoute` if no route has that name
    pub fn remove_by_name(&mut self, name: &str) -> Result<()> {
        self.ensure_building()?;
        let id = self.names.remove(name).ok_or_else(|| Error::UnknownRoute {
            name: name.to_string(),
        })?;
        if let Some(route) = self.routes.get_mut(id).and_then(Option::take) {
            self.trie.remove(route.method, route.template.segments());
            debug!(route = %route, "Route removed");
        }
        Ok(())
    }

    /// Validate the table, compose every chain and seal the router
    ///
    /// Calling it again on a sealed router does nothing.
    ///
    /// # Errors
    ///
    /// Returns `Error::AmbiguousRoute` if a route can never match because an
    /// earlier unconstrained parameter at the same depth always wins. The
    /// router stays in the building phase in that case.
    pub fn build(&mut self) -> Result<()> {
        if self.sealed {
            return Ok(());
        }

        if let Some(shadowed) = self.trie.shadowed().first() {
            return Err(Error::AmbiguousRoute {
                method: shadowed.method,
                template: self.template_of(shadowed.route),
                shadowed_by: self.template_of(shadowed.by),
            });
        }

        let global = &self.global;
        let done_global = &self.done_global;
        for route in self.routes.iter_mut().flatten() {
            route.chain = Some(route.compose(global, done_global));
            debug!(
                route = %route,
                handlers = route.chain.as_ref().map_or(0, Chain::len),
                "Route chain composed"
            );
        }
        self.global_chain = Chain::new(self.global.clone());
        self.static_paths = self.trie.static_paths();
        self.sealed = true;

        info!(
            routes = self.len(),
            named = self.names.len(),
            error_handlers = self.error_handlers.len(),
            "Router built"
        );
        Ok(())
    }

    /// Whether `build()` has run
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Number of registered routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    /// Whether no route is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Look up a route by handle
    #[must_use]
    pub fn route(&self, handle: RouteHandle) -> Option<&Route> {
        self.routes
            .get(handle.id)
            .and_then(Option::as_ref)
            .filter(|r| r.method == handle.method)
    }

    /// Look up a route by name
    #[must_use]
    pub fn route_by_name(&self, name: &str) -> Option<&Route> {
        self.names
            .get(name)
            .and_then(|id| self.routes.get(*id))
            .and_then(Option::as_ref)
    }

    /// All live routes in registration order
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().flatten()
    }

    /// Whether `method path` resolves to a route
    #[must_use]
    pub fn route_exists(&self, method: Method, path: &str) -> bool {
        let path = self.request_path(path);
        matches!(self.trie.lookup(method, &path), Lookup::Found { .. })
    }

    /// Resolve a request
    ///
    /// Works in both phases; while building, the chain is composed on the
    /// fly from the current registrations.
    #[must_use]
    pub fn resolve(&self, method: Method, path: &str) -> Outcome {
        let path = self.request_path(path);

        match self.trie.lookup(method, &path) {
            Lookup::Found { route, params } => {
                let Some(route) = self.routes.get(route).and_then(Option::as_ref) else {
                    warn!(route_id = route, "Trie points at a removed route");
                    return self.not_found(&path);
                };
                let chain = route
                    .chain
                    .clone()
                    .unwrap_or_else(|| route.compose(&self.global, &self.done_global));
                Outcome::Matched(ResolvedRoute {
                    route_id: route.id,
                    name: route.name.clone(),
                    chain,
                    params: self.bind_params(params),
                })
            }
            Lookup::MethodNotAllowed(allowed) if self.config.fire_method_not_allowed => {
                Outcome::MethodNotAllowed { allowed }
            }
            Lookup::MethodNotAllowed(_) | Lookup::NotFound => self.not_found(&path),
        }
    }

    /// Resolve and run a request, producing its response
    ///
    /// Misses, explicit error stops, chains that end on an error status with
    /// no body, and panics fire the error-code chain for the resulting status,
    /// or write a default JSON error body.
    #[must_use]
    pub fn dispatch(&self, request: Request, cancel: CancellationToken) -> Response {
        let outcome = self.resolve(request.method, &request.path);
        let mut ctx = Context::new(request, cancel);

        match outcome {
            Outcome::Matched(resolved) => {
                ctx.bind(resolved.params, resolved.name);
                match resolved.chain.run(&mut ctx) {
                    StopReason::Explicit if ctx.status() >= 400 => {
                        let status = ctx.status();
                        self.fire_error(status, &mut ctx);
                    }
                    StopReason::Implicit | StopReason::Exhausted
                        if ctx.status() >= 400 && ctx.response().body.is_empty() =>
                    {
                        let status = ctx.status();
                        self.fire_error(status, &mut ctx);
                    }
                    StopReason::Panicked => {
                        ctx.response_mut().body.clear();
                        self.fire_error(500, &mut ctx);
                    }
                    StopReason::Cancelled => {
                        debug!(path = %ctx.request().path, "Dispatch cancelled");
                    }
                    _ => {}
                }
            }
            Outcome::NotFound { suggestions } => {
                ctx.set_suggestions(suggestions);
                self.fire_miss(404, &mut ctx);
            }
            Outcome::MethodNotAllowed { allowed } => {
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                ctx.response_mut().set_header("Allow", &allow);
                ctx.set_allowed_methods(allowed);
                self.fire_miss(405, &mut ctx);
            }
        }

        ctx.into_response()
    }

    /// Build a URL for a named route
    ///
    /// Every parameter of the template must be supplied and satisfy its
    /// constraint; unknown parameter names are rejected. Values are
    /// percent-encoded, a wildcard value keeps its `/` separators and must
    /// not be empty.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownRoute` if no route has that name
    /// - `Error::InvalidParams` for missing, unknown or invalid values
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String> {
        let route = self.route_by_name(name).ok_or_else(|| Error::UnknownRoute {
            name: name.to_string(),
        })?;
        let invalid = |reason: String| Error::InvalidParams {
            name: name.to_string(),
            reason,
        };

        let template = route.path_template();
        if let Some((unknown, _)) = params
            .iter()
            .find(|(key, _)| !template.param_names().any(|n| n == *key))
        {
            return Err(invalid(format!("unknown parameter {unknown:?}")));
        }
        let value_of = |param: &str| {
            params
                .iter()
                .find(|(key, _)| *key == param)
                .map(|(_, value)| *value)
                .ok_or_else(|| invalid(format!("missing parameter {param:?}")))
        };

        let mut url = String::new();
        for segment in template.segments() {
            url.push('/');
            match segment {
                Segment::Static(literal) => url.push_str(literal),
                Segment::Param {
                    name: param,
                    constraint,
                } => {
                    let value = value_of(param)?;
                    let encoded = percent_encode(value);
                    if constraint.check(&encoded).is_err() {
                        return Err(invalid(format!(
                            "{value:?} does not satisfy {param}:{constraint}"
                        )));
                    }
                    url.push_str(&encoded);
                }
                Segment::Wildcard { name: param } => {
                    let value = value_of(param)?.trim_start_matches('/');
                    if value.split('/').any(str::is_empty) {
                        return Err(invalid(format!(
                            "{value:?} has an empty segment for {param}"
                        )));
                    }
                    let encoded: Vec<String> = value.split('/').map(percent_encode).collect();
                    url.push_str(&encoded.join("/"));
                }
            }
        }
        if url.is_empty() {
            url.push('/');
        }
        Ok(url)
    }

    pub(crate) fn register_scoped(
        &mut self,
        method: Method,
        template: &str,
        name: Option<&str>,
        handlers: Vec<HandlerRef>,
        scope_middleware: &[HandlerRef],
        scope_done: &[HandlerRef],
    ) -> Result<RouteHandle> {
        self.ensure_building()?;
        let template = PathTemplate::parse(template, &self.param_types)?;
        let occupant = self.trie.get(method, template.segments());

        if let Some(name) = name {
            if self
                .names
                .get(name)
                .is_some_and(|id| Some(*id) != occupant || !self.config.allow_override)
            {
                return Err(Error::DuplicateRouteName {
                    name: name.to_string(),
                });
            }
        }

        let id = self.routes.len();
        let replaced = self.trie.insert(
            method,
            template.as_str(),
            template.segments(),
            id,
            self.config.allow_override,
        )?;
        if let Some(old) = replaced.and_then(|old| self.routes.get_mut(old)).and_then(Option::take) {
            if let Some(old_name) = &old.name {
                self.names.remove(old_name);
            }
            debug!(route = %old, "Route overridden");
        }

        let route = Route {
            id,
            method,
            template,
            name: name.map(str::to_string),
            handlers,
            middleware: [self.middleware.as_slice(), scope_middleware].concat(),
            done: [scope_done, self.done.as_slice()].concat(),
            metadata: HashMap::new(),
            chain: None,
        };
        if let Some(name) = &route.name {
            self.names.insert(name.clone(), id);
        }
        debug!(
            method = %method,
            template = route.template(),
            name = route.name().unwrap_or("-"),
            route_id = id,
            "Route registered"
        );

        let handle = route.handle();
        self.routes.push(Some(route));
        Ok(handle)
    }

    pub(crate) fn any_scoped(
        &mut self,
        template: &str,
        handlers: Vec<HandlerRef>,
        scope_middleware: &[HandlerRef],
        scope_done: &[HandlerRef],
    ) -> Result<Vec<RouteHandle>> {
        self.ensure_building()?;
        let parsed = PathTemplate::parse(template, &self.param_types)?;
        if !self.config.allow_override {
            if let Some(method) = Method::ALL
                .into_iter()
                .find(|m| self.trie.get(*m, parsed.segments()).is_some())
            {
                return Err(Error::DuplicateRoute {
                    method,
                    template: template.to_string(),
                });
            }
        }

        Method::ALL
            .into_iter()
            .map(|method| {
                self.register_scoped(
                    method,
                    template,
                    None,
                    handlers.clone(),
                    scope_middleware,
                    scope_done,
                )
            })
            .collect()
    }

    fn ensure_building(&self) -> Result<()> {
        if self.sealed {
            Err(Error::RouterSealed)
        } else {
            Ok(())
        }
    }

    fn template_of(&self, id: RouteId) -> String {
        self.routes
            .get(id)
            .and_then(Option::as_ref)
            .map(|r| r.template().to_string())
            .unwrap_or_default()
    }

    fn request_path<'p>(&self, path: &'p str) -> Cow<'p, str> {
        if self.config.path_correction {
            correct_path(path)
        } else {
            Cow::Borrowed(path)
        }
    }

    fn not_found(&self, path: &str) -> Outcome {
        let limit = self.config.suggestion_limit;
        let max_distance = self.config.max_suggestion_distance;
        let suggestions = if limit == 0 {
            Vec::new()
        } else if self.sealed {
            closest_paths(&self.static_paths, path, limit, max_distance)
        } else {
            self.trie.suggest(path, limit, max_distance)
        };
        Outcome::NotFound { suggestions }
    }

    fn bind_params(&self, raw: Vec<RawParam<'_>>) -> Params {
        let decode = self.config.decode_params;
        let mut params = Params::new();
        for param in raw {
            let value = match param.value {
                ParamValue::String(s) if decode => ParamValue::String(percent_decode(&s)),
                ParamValue::Path(s) if decode => ParamValue::Path(percent_decode(&s)),
                other => other,
            };
            params.push(param.name, value);
        }
        params
    }

    /// Error firing for requests no route matched
    ///
    /// Global handlers run first since no route chain carried them; one
    /// that stops (a CORS preflight, a rate limit) answers the request.
    fn fire_miss(&self, status: u16, ctx: &mut Context) {
        ctx.set_status(status);
        let global = if self.sealed {
            Cow::Borrowed(&self.global_chain)
        } else {
            Cow::Owned(Chain::new(self.global.clone()))
        };
        if !global.is_empty() {
            let reason = global.run(ctx);
            if reason != StopReason::Exhausted {
                if reason == StopReason::Panicked {
                    ctx.response_mut().body.clear();
                    self.fire_error(500, ctx);
                }
                return;
            }
        }
        self.fire_error(status, ctx);
    }

    fn fire_error(&self, status: u16, ctx: &mut Context) {
        ctx.set_status(status);
        if let Some(chain) = self.error_handlers.get(&status) {
            debug!(status, handlers = chain.len(), "Firing error handlers");
            chain.run(ctx);
            return;
        }
        if !ctx.response().body.is_empty() {
            return;
        }

        let reason = hyper::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Error");
        let mut body = json!({ "error": reason });
        if status == 404 && !ctx.suggestions().is_empty() {
            body["suggestions"] = json!(ctx.suggestions());
        }
        if let Err(e) = ctx.write_json(&body) {
            warn!(status, error = %e, "Failed to write default error body");
        }
    }
}
