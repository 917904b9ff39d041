//! # Route Groups
//!
//! A group shares a path prefix and middleware between its routes. Groups
//! nest: a child group joins its prefix onto the parent's and runs the
//! parent's middleware before its own.

use crate::error::Result;
use crate::middleware::HandlerRef;
use crate::route::RouteHandle;
use crate::router::{Method, Router};
use crate::template::join_path;

/// Prefix- and middleware-scoped view of a [`Router`]
pub struct Group<'r> {
    router: &'r mut Router,
    prefix: String,
    middleware: Vec<HandlerRef>,
    done: Vec<HandlerRef>,
}

impl<'r> Group<'r> {
    pub(crate) fn new(router: &'r mut Router, prefix: &str, middleware: Vec<HandlerRef>) -> Self {
        Self {
            router,
            prefix: join_path(prefix, ""),
            middleware,
            done: Vec::new(),
        }
    }

    /// Full prefix of this group
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Add middleware for routes registered through this group from now on
    pub fn use_middleware(&mut self, handler: HandlerRef) -> &mut Self {
        self.middleware.push(handler);
        self
    }

    /// Add a handler that runs after the route handlers of this group's routes
    pub fn done(&mut self, handler: HandlerRef) -> &mut Self {
        self.done.push(handler);
        self
    }

    /// Open a nested group
    ///
    /// The child inherits this group's prefix, middleware and `done`
    /// handlers as they are now.
    pub fn group(&mut self, prefix: &str, middleware: Vec<HandlerRef>) -> Group<'_> {
        Group {
            prefix: join_path(&self.prefix, prefix),
            middleware: [self.middleware.as_slice(), &middleware].concat(),
            done: self.done.clone(),
            router: &mut *self.router,
        }
    }

    /// Register a route relative to the group prefix
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn register(
        &mut self,
        method: Method,
        template: &str,
        name: Option<&str>,
        handlers: Vec<HandlerRef>,
    ) -> Result<RouteHandle> {
        let full = join_path(&self.prefix, template);
        self.router
            .register_scoped(method, &full, name, handlers, &self.middleware, &self.done)
    }

    /// Register an unnamed route relative to the group prefix
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

    /// Register a named route relative to the group prefix
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
        /// Register a GET route in the group
        get => Get,
        /// Register a POST route in the group
        post => Post,
        /// Register a PUT route in the group
        put => Put,
        /// Register a DELETE route in the group
        delete => Delete,
        /// Register a PATCH route in the group
        patch => Patch,
        /// Register a HEAD route in the group
        head => Head,
        /// Register an OPTIONS route in the group
        options => Options,
        /// Register a CONNECT route in the group
        connect => Connect,
        /// Register a TRACE route in the group
        trace => Trace,
    }

    /// Register the same handlers for every method
    ///
    /// # Errors
    ///
    /// See [`Router::any`].
    pub fn any(&mut self, template: &str, handlers: Vec<HandlerRef>) -> Result<Vec<RouteHandle>> {
        let full = join_path(&self.prefix, template);
        self.router
            .any_scoped(&full, handlers, &self.middleware, &self.done)
    }
}
