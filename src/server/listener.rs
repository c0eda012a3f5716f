//! Protocol Listeners
//!
//! A [`Listener`] binds one TCP endpoint and serves one protocol on it until
//! its shutdown token fires. The supervisor only sees this trait, so tests
//! can swap in listeners that bind slowly, fail, or refuse to drain.

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::conn::serve_connections;
use super::{Protocol, ServerError};
use crate::presentation::grpc::GrpcRoutes;

/// One network endpoint owned by the supervisor.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    fn protocol(&self) -> Protocol;

    /// `host:port` to bind.
    fn address(&self) -> &str;

    async fn bind(&self) -> std::io::Result<TcpListener> {
        TcpListener::bind(self.address()).await
    }

    /// Accept and serve until `shutdown` is cancelled, then stop accepting,
    /// let in-flight work finish and return.
    ///
    /// The supervisor aborts this future when the drain times out, so any
    /// connection it still holds must end when it is dropped.
    async fn serve(
        self: Box<Self>,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), ServerError>;
}

/// HTTP front-end serving an axum router.
pub struct HttpListener {
    address: String,
    router: Router,
}

impl HttpListener {
    pub fn new(address: impl Into<String>, router: Router) -> Self {
        Self {
            address: address.into(),
            router,
        }
    }
}

#[async_trait]
impl Listener for HttpListener {
    fn protocol(&self) -> Protocol {
        Protocol::Http
    }

    fn address(&self) -> &str {
        &self.address
    }

    async fn serve(
        self: Box<Self>,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), ServerError> {
        serve_connections(
            Protocol::Http,
            listener,
            self.router,
            shutdown.cancelled_owned(),
        )
        .await
    }
}

/// gRPC front-end serving the routes from `build_routes`.
pub struct GrpcListener {
    address: String,
    routes: GrpcRoutes,
}

impl GrpcListener {
    pub fn new(address: impl Into<String>, routes: GrpcRoutes) -> Self {
        Self {
            address: address.into(),
            routes,
        }
    }
}

#[async_trait]
impl Listener for GrpcListener {
    fn protocol(&self) -> Protocol {
        Protocol::Grpc
    }

    fn address(&self) -> &str {
        &self.address
    }

    async fn serve(
        self: Box<Self>,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), ServerError> {
        let GrpcRoutes { router, health } = self.routes;

        // Health checks flip to NOT_SERVING as soon as the drain begins
        let signal = async move {
            shutdown.cancelled().await;
            health.mark_not_serving().await;
            info!("gRPC health set to NOT_SERVING");
        };

        serve_connections(Protocol::Grpc, listener, router, signal).await
    }
}
