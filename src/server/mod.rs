//! # Server Supervisor
//!
//! Owns the HTTP and gRPC listeners of one process.
//!
//! [`Server::start`] launches both listeners on their own tasks and returns
//! immediately with a [`Readiness`] handle. [`Server::shutdown`] drains them
//! one after the other, HTTP first, each bounded by the drain timeout. A
//! listener that fails never takes the other one down with it.

mod conn;
mod error;
mod listener;

pub use error::{BoxError, ServerError};
pub use listener::{GrpcListener, HttpListener, Listener};

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Instrument, Span};

use crate::infrastructure::metrics;

/// Wire protocol served by a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Http,
    Grpc,
}

impl Protocol {
    /// Lower-case label used for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Grpc => "grpc",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => f.write_str("HTTP"),
            Protocol::Grpc => f.write_str("gRPC"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Idle,
    Running,
    Stopped,
}

/// Bind result of one listener.
#[derive(Debug)]
pub struct ListenerReadiness {
    pub protocol: Protocol,
    pub result: Result<SocketAddr, ServerError>,
}

impl ListenerReadiness {
    pub fn is_ready(&self) -> bool {
        self.result.is_ok()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.result.as_ref().ok().copied()
    }
}

/// Bind results of the started listeners, delivered as each one reports.
pub struct Readiness {
    pending: FuturesUnordered<BoxFuture<'static, (usize, ListenerReadiness)>>,
}

impl Readiness {
    fn new(receivers: Vec<(Protocol, oneshot::Receiver<Result<SocketAddr, ServerError>>)>) -> Self {
        let pending = receivers
            .into_iter()
            .enumerate()
            .map(|(index, (protocol, rx))| {
                async move {
                    let result = rx
                        .await
                        .unwrap_or(Err(ServerError::NeverBound { protocol }));
                    (index, ListenerReadiness { protocol, result })
                }
                .boxed()
            })
            .collect();
        Self { pending }
    }

    /// Next listener to report, whichever binds or fails first. `None` once
    /// every listener has reported.
    pub async fn next(&mut self) -> Option<ListenerReadiness> {
        self.pending.next().await.map(|(_, ready)| ready)
    }

    /// Wait for all listeners. Results come back in start order.
    pub async fn wait(self) -> Vec<ListenerReadiness> {
        let mut ready: Vec<_> = self.pending.collect().await;
        ready.sort_by_key(|(index, _)| *index);
        ready.into_iter().map(|(_, ready)| ready).collect()
    }
}

impl fmt::Debug for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Readiness")
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// How a single listener ended during shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Stopped accepting and finished in-flight work in time.
    Drained,
    /// Returned an error while draining, or had already failed.
    Failed(String),
    /// Did not finish within the drain timeout. The listener and every
    /// connection it still held were dropped.
    ForceClosed,
    /// Never bound, so there was nothing to drain.
    NotRunning,
}

impl DrainOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrainOutcome::Drained => "drained",
            DrainOutcome::Failed(_) => "failed",
            DrainOutcome::ForceClosed => "force_closed",
            DrainOutcome::NotRunning => "not_running",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerShutdown {
    pub protocol: Protocol,
    pub outcome: DrainOutcome,
}

/// Per-listener shutdown outcomes in the order they were drained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    pub listeners: Vec<ListenerShutdown>,
}

impl ShutdownReport {
    pub fn outcome(&self, protocol: Protocol) -> Option<&DrainOutcome> {
        self.listeners
            .iter()
            .find(|l| l.protocol == protocol)
            .map(|l| &l.outcome)
    }

    /// True when every listener either drained or never ran.
    pub fn is_clean(&self) -> bool {
        self.listeners.iter().all(|l| {
            matches!(
                l.outcome,
                DrainOutcome::Drained | DrainOutcome::NotRunning
            )
        })
    }
}

struct RunningListener {
    protocol: Protocol,
    shutdown: CancellationToken,
    task: JoinHandle<Result<(), ServerError>>,
}

/// Dual-protocol server supervisor.
pub struct Server {
    pending: Vec<Box<dyn Listener>>,
    running: Vec<RunningListener>,
    drain_timeout: Duration,
    state: ServerState,
    span: Span,
}

impl Server {
    /// Listeners are started in the order given and drained in the same
    /// order, so pass HTTP first.
    pub fn new(
        http: Box<dyn Listener>,
        grpc: Box<dyn Listener>,
        drain_timeout: Duration,
        span: Span,
    ) -> Self {
        Self {
            pending: vec![http, grpc],
            running: Vec::new(),
            drain_timeout,
            state: ServerState::Idle,
            span,
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Launch every listener on its own task and return without waiting
    /// for any of them to bind.
    pub fn start(&mut self) -> Result<Readiness, ServerError> {
        if self.state != ServerState::Idle {
            return Err(ServerError::AlreadyStarted);
        }

        let mut pending = Vec::with_capacity(self.pending.len());
        for listener in std::mem::take(&mut self.pending) {
            let protocol = listener.protocol();
            let (ready_tx, ready_rx) = oneshot::channel();
            let shutdown = CancellationToken::new();
            let task = tokio::spawn(
                run_listener(listener, ready_tx, shutdown.clone()).instrument(self.span.clone()),
            );
            self.running.push(RunningListener {
                protocol,
                shutdown,
                task,
            });
            pending.push((protocol, ready_rx));
        }

        self.state = ServerState::Running;
        Ok(Readiness::new(pending))
    }

    /// Drain listeners sequentially in start order.
    ///
    /// Every listener is attempted even when an earlier one failed or had
    /// to be force-closed.
    pub async fn shutdown(&mut self) -> Result<ShutdownReport, ServerError> {
        if self.state != ServerState::Running {
            return Err(ServerError::NotRunning);
        }

        let drain_timeout = self.drain_timeout;
        let listeners = std::mem::take(&mut self.running);

        let report = async move {
            let mut report = ShutdownReport::default();
            for listener in listeners {
                let protocol = listener.protocol;
                info!(%protocol, "Shutting down {} server", protocol);

                let outcome = drain(listener, drain_timeout).await;
                match &outcome {
                    DrainOutcome::Drained => info!(%protocol, "{} server stopped", protocol),
                    DrainOutcome::NotRunning => {
                        info!(%protocol, "{} server was not running", protocol)
                    }
                    DrainOutcome::Failed(reason) => {
                        error!(%protocol, error = %reason, "{} server shutdown failed", protocol)
                    }
                    DrainOutcome::ForceClosed => warn!(
                        %protocol,
                        timeout_secs = drain_timeout.as_secs_f64(),
                        "{} server did not drain in time, force closed",
                        protocol
                    ),
                }
                metrics::record_drain(protocol.as_str(), outcome.as_str());

                report.listeners.push(ListenerShutdown { protocol, outcome });
            }
            report
        }
        .instrument(self.span.clone())
        .await;

        self.state = ServerState::Stopped;
        Ok(report)
    }
}

async fn run_listener(
    listener: Box<dyn Listener>,
    ready: oneshot::Sender<Result<SocketAddr, ServerError>>,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let protocol = listener.protocol();
    let address = listener.address().to_string();
    info!(%protocol, %address, "{} server starting on {}", protocol, address);

    let bound = tokio::select! {
        bound = listener.bind() => bound.and_then(|l| {
            let local = l.local_addr()?;
            Ok((l, local))
        }),
        _ = shutdown.cancelled() => {
            let _ = ready.send(Err(ServerError::NeverBound { protocol }));
            return Err(ServerError::NeverBound { protocol });
        }
    };

    let (bound, local_addr) = match bound {
        Ok(bound) => bound,
        Err(source) => {
            let err = ServerError::Bind {
                protocol,
                address,
                source,
            };
            error!(%protocol, error = %err, "{} server failed to start", protocol);
            let _ = ready.send(Err(err));
            return Err(ServerError::NeverBound { protocol });
        }
    };

    info!(%protocol, %local_addr, "{} server listening on {}", protocol, local_addr);
    metrics::set_listener_up(protocol.as_str(), true);
    let _ = ready.send(Ok(local_addr));

    let result = listener.serve(bound, shutdown).await;
    metrics::set_listener_up(protocol.as_str(), false);
    if let Err(e) = &result {
        error!(%protocol, error = %e, "{} server error", protocol);
    }
    result
}

async fn drain(listener: RunningListener, timeout: Duration) -> DrainOutcome {
    let RunningListener {
        protocol,
        shutdown,
        mut task,
    } = listener;

    shutdown.cancel();

    match tokio::time::timeout(timeout, &mut task).await {
        Ok(Ok(Ok(()))) => DrainOutcome::Drained,
        Ok(Ok(Err(ServerError::NeverBound { .. }))) => DrainOutcome::NotRunning,
        Ok(Ok(Err(e))) => DrainOutcome::Failed(e.to_string()),
        Ok(Err(join_err)) => {
            DrainOutcome::Failed(format!("{protocol} listener task aborted: {join_err}"))
        }
        Err(_) => {
            task.abort();
            let _ = task.await;
            metrics::set_listener_up(protocol.as_str(), false);
            DrainOutcome::ForceClosed
        }
    }
}
