//! Application Startup
//!
//! Process lifecycle: connect stores, wire dependencies, run the server
//! supervisor until a termination signal arrives, then tear everything
//! down in reverse order.
//!
//! ```text
//! Init -> ConfigLoaded -> StoresConnected -> DependenciesWired
//!      -> ServerStarted -> AwaitingSignal -> ShuttingDown -> Terminated
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::{error, info, warn, Instrument, Span};

use crate::application::services::{ConnService, ConnServiceImpl, UserService, UserServiceImpl};
use crate::config::Settings;
use crate::infrastructure::cache::{RedisCache, RedisUserCache};
use crate::infrastructure::repositories::{PgConnRepository, PgUserRepository};
use crate::infrastructure::{StoreError, StoreProbe, Stores};
use crate::presentation::grpc::{self, ChatGrpcService, ServiceRegistry};
use crate::presentation::http::{handlers::health, routes};
use crate::presentation::middleware::{cors, logging};
use crate::server::{GrpcListener, HttpListener, Server, ServerError, ShutdownReport};
use crate::shared::snowflake::SnowflakeGenerator;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserService>,
    pub conns: Arc<dyn ConnService>,
    pub probe: Arc<dyn StoreProbe>,
}

/// Service handles for both protocol adapters. Built once, never mutated.
#[derive(Clone)]
pub struct Dependencies {
    pub http: AppState,
    pub grpc: ServiceRegistry,
}

impl Dependencies {
    pub fn new(
        users: Arc<dyn UserService>,
        conns: Arc<dyn ConnService>,
        probe: Arc<dyn StoreProbe>,
    ) -> Self {
        let grpc = ServiceRegistry::new().with(ChatGrpcService::new(users.clone(), conns.clone()));
        Self {
            http: AppState {
                users,
                conns,
                probe,
            },
            grpc,
        }
    }
}

/// Startup errors
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Stores(#[from] StoreError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Init,
    ConfigLoaded,
    StoresConnected,
    DependenciesWired,
    ServerStarted,
    AwaitingSignal,
    ShuttingDown,
    Terminated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Current phase plus the span every lifecycle event is logged in.
#[derive(Debug)]
pub struct Lifecycle {
    phase: Phase,
    span: Span,
}

impl Lifecycle {
    pub fn new(span: Span) -> Self {
        info!(parent: &span, phase = %Phase::Init, "Lifecycle started");
        Self {
            phase: Phase::Init,
            span,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Phases only move forward; anything else is logged and ignored.
    pub fn advance(&mut self, next: Phase) {
        if next <= self.phase {
            warn!(parent: &self.span, from = %self.phase, to = %next, "Ignoring backwards phase transition");
            return;
        }
        info!(parent: &self.span, from = %self.phase, to = %next, "Lifecycle phase changed");
        self.phase = next;
    }
}

/// Application instance
pub struct Application {
    settings: Settings,
    stores: Stores,
    deps: Dependencies,
    lifecycle: Lifecycle,
}

impl Application {
    /// Connect stores and wire dependencies.
    ///
    /// A store failure is logged and returned; nothing has been started at
    /// that point and no connection is left open.
    pub async fn build(settings: Settings, mut lifecycle: Lifecycle) -> Result<Self, StartupError> {
        let span = lifecycle.span().clone();

        let stores = match Stores::connect(&settings).instrument(span.clone()).await {
            Ok(stores) => stores,
            Err(e) => {
                error!(parent: &span, error = %e, "Failed to connect to stores");
                return Err(e.into());
            }
        };
        lifecycle.advance(Phase::StoresConnected);

        if let Err(e) = stores.migrate().instrument(span.clone()).await {
            error!(parent: &span, error = %e, "Failed to run migrations");
            stores.close(&span).await;
            return Err(e.into());
        }

        let deps = wire(&settings, &stores);
        health::init_server_start();
        lifecycle.advance(Phase::DependenciesWired);

        Ok(Self {
            settings,
            stores,
            deps,
            lifecycle,
        })
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Serve until `signal` resolves, then shut down and release the
    /// stores.
    pub async fn run_until<F>(self, signal: F) -> Result<ShutdownReport, StartupError>
    where
        F: Future<Output = ()>,
    {
        let Application {
            settings,
            stores,
            deps,
            mut lifecycle,
        } = self;
        let span = lifecycle.span().clone();

        let result = match build_server(&settings, deps, span.clone()).await {
            Ok(server) => serve_until(server, signal, &mut lifecycle).await,
            Err(e) => {
                error!(parent: &span, error = %e, "Failed to build server");
                Err(e)
            }
        };

        stores.close(&span).await;
        lifecycle.advance(Phase::Terminated);

        Ok(result?)
    }
}

/// Repositories, usecases and adapter handles over live stores.
pub fn wire(settings: &Settings, stores: &Stores) -> Dependencies {
    let ids = Arc::new(SnowflakeGenerator::new(settings.snowflake.machine_id));

    let user_repo = Arc::new(PgUserRepository::new(stores.db.clone()));
    let user_cache = Arc::new(RedisUserCache::new(
        RedisCache::new(stores.redis.clone()),
        settings.redis.user_ttl_secs,
    ));
    let conn_repo = Arc::new(PgConnRepository::new(stores.db.clone()));

    let users: Arc<dyn UserService> =
        Arc::new(UserServiceImpl::new(user_repo, user_cache, ids.clone()));
    let conns: Arc<dyn ConnService> = Arc::new(ConnServiceImpl::new(conn_repo, ids));

    Dependencies::new(users, conns, Arc::new(stores.probe()))
}

/// Construct the supervisor with both protocol adapters bound to `deps`.
pub async fn build_server(
    settings: &Settings,
    deps: Dependencies,
    span: Span,
) -> Result<Server, ServerError> {
    let router = routes::create_router(deps.http)
        .layer(logging::create_trace_layer())
        .layer(cors::create_cors_layer(&settings.cors));

    let grpc_routes = grpc::build_routes(&deps.grpc).instrument(span.clone()).await?;

    Ok(Server::new(
        Box::new(HttpListener::new(settings.server.http_addr(), router)),
        Box::new(GrpcListener::new(settings.server.grpc_addr(), grpc_routes)),
        settings.server.shutdown_timeout(),
        span,
    ))
}

/// Start `server`, wait for `signal`, then shut it down exactly once.
///
/// Bind results are logged as they arrive. A listener that never binds
/// does not hold up the wait for the signal.
pub async fn serve_until<F>(
    mut server: Server,
    signal: F,
    lifecycle: &mut Lifecycle,
) -> Result<ShutdownReport, ServerError>
where
    F: Future<Output = ()>,
{
    let span = lifecycle.span().clone();
    let mut readiness = server.start()?;
    lifecycle.advance(Phase::ServerStarted);

    tokio::pin!(signal);
    let signalled = loop {
        tokio::select! {
            ready = readiness.next() => match ready {
                Some(listener) => match &listener.result {
                    Ok(addr) => info!(parent: &span, protocol = %listener.protocol, %addr, "{} server ready", listener.protocol),
                    Err(e) => error!(parent: &span, protocol = %listener.protocol, error = %e, "{} server not available", listener.protocol),
                },
                None => break false,
            },
            _ = &mut signal => {
                warn!(parent: &span, "Termination signal received before all listeners were ready");
                break true;
            }
        }
    };

    lifecycle.advance(Phase::AwaitingSignal);
    if !signalled {
        signal.await;
        info!(parent: &span, "Termination signal received");
    }

    lifecycle.advance(Phase::ShuttingDown);
    let report = server.shutdown().await?;
    if report.is_clean() {
        info!(parent: &span, "Server shutdown complete");
    } else {
        warn!(parent: &span, ?report, "Server shutdown completed with errors");
    }
    Ok(report)
}

/// Resolves on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
