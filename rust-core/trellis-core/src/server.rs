//! # Hyper Adapter
//!
//! Connects a built [`Router`] to hyper. Listening sockets, TLS and shutdown
//! belong to the embedding application; this module serves requests on a
//! connection it is handed.
//!
//! ## Key Features
//!
//! - `RouterService` implements `hyper::service::Service` for any body type
//! - Bodies are read up to `RouterConfig::max_body_size` and cut off with
//!   413 beyond it
//! - Dispatch runs on the blocking pool; handlers are synchronous
//! - A dropped response future (client gone) cancels the request

use crate::error::{Error, Result};
use crate::request::{BoxError, Request};
use crate::response::Response;
use crate::router::Router;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// hyper service backed by a shared router
#[derive(Debug, Clone)]
pub struct RouterService {
    router: Arc<Router>,
    remote_addr: Option<SocketAddr>,
}

impl RouterService {
    /// Wrap a router; it should already be built
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        if !router.is_sealed() {
            warn!("Serving a router that has not been built; chains are composed per request");
        }
        Self {
            router,
            remote_addr: None,
        }
    }

    /// Record the peer address; exposed to handlers as `x-client-ip`
    #[must_use]
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }
}

impl<B> Service<hyper::Request<B>> for RouterService
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError> + Send,
{
    type Response = hyper::Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Infallible>> + Send>>;

    fn call(&self, req: hyper::Request<B>) -> Self::Future {
        let router = Arc::clone(&self.router);
        let remote_addr = self.remote_addr;
        Box::pin(async move { Ok(handle_request(req, router, remote_addr).await) })
    }
}

/// Serve one HTTP/1 connection until the peer closes it
///
/// # Errors
///
/// Returns `Error::Http` if the connection fails at the protocol level.
pub async fn serve_connection<I>(
    io: I,
    router: Arc<Router>,
    remote_addr: Option<SocketAddr>,
) -> Result<()>
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let mut service = RouterService::new(router);
    if let Some(addr) = remote_addr {
        service = service.with_remote_addr(addr);
    }
    http1::Builder::new()
        .keep_alive(true)
        .serve_connection(TokioIo::new(io), service)
        .await?;
    Ok(())
}

async fn handle_request<B>(
    req: hyper::Request<B>,
    router: Arc<Router>,
    remote_addr: Option<SocketAddr>,
) -> hyper::Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let version = req.version();

    let mut request =
        match Request::from_hyper_with_limit(req, router.config().max_body_size).await {
            Ok(r) => r,
            Err(e) => {
                let status = match e {
                    Error::MethodNotImplemented { .. } => 501,
                    Error::PayloadTooLarge { .. } => 413,
                    _ => 400,
                };
                warn!(%method, %path, error = %e, status, "Rejected request");
                return error_response(status).into_hyper();
            }
        };

    if let Some(addr) = remote_addr {
        request.set_header("x-client-ip", &addr.ip().to_string());
    }

    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();
    let dispatch = tokio::task::spawn_blocking(move || router.dispatch(request, cancel));
    let response = match dispatch.await {
        Ok(response) => response,
        Err(e) => {
            error!(%method, %path, error = %e, "Dispatch task failed");
            error_response(500)
        }
    };
    guard.disarm();

    info!(
        remote = %remote_addr.map_or_else(|| "-".to_string(), |a| a.to_string()),
        %method,
        %path,
        version = ?version,
        status = response.status,
        "Request served"
    );
    response.into_hyper()
}

fn error_response(status: u16) -> Response {
    let reason = hyper::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Error");
    Response::json(format!(r#"{{"error":"{reason}"}}"#)).with_status(status)
}
