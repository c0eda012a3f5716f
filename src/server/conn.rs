//! Connection ownership for the built-in listeners.
//!
//! [`serve_connections`] runs the accept loop itself instead of handing
//! connections to a detached runtime task. Every connection lives in a
//! `JoinSet` owned by the serving future, and every HTTP/2 stream task hyper
//! spawns is tied to a stop token that fires when that future goes away.
//! Aborting the listener task therefore ends all of its in-flight requests.

use std::future::Future;
use std::time::Duration;

use axum::Router;
use hyper_util::rt::TokioIo;
use hyper_util::server::conn::auto;
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{Protocol, ServerError};

/// Spawns hyper's per-stream tasks so they stop with their listener.
#[derive(Clone)]
struct ScopedExecutor {
    stop: CancellationToken,
}

impl<F> hyper::rt::Executor<F> for ScopedExecutor
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    fn execute(&self, fut: F) {
        let stop = self.stop.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = stop.cancelled() => {}
                _ = fut => {}
            }
        });
    }
}

/// Accept and serve `router` until `signal` resolves, then stop accepting
/// and wait for open connections to finish.
///
/// Dropping the returned future drops every connection it accepted.
pub(super) async fn serve_connections<F>(
    protocol: Protocol,
    listener: TcpListener,
    router: Router,
    signal: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send,
{
    let stop = CancellationToken::new();
    let _stop_on_drop = stop.clone().drop_guard();
    let executor = ScopedExecutor { stop };

    let service = TowerToHyperService::new(router);
    let graceful = GracefulShutdown::new();
    let mut connections = JoinSet::new();
    tokio::pin!(signal);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, remote) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(%protocol, error = %e, "{} accept failed", protocol);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        continue;
                    }
                };

                let watcher = graceful.watcher();
                let executor = executor.clone();
                let service = service.clone();
                connections.spawn(async move {
                    let builder = auto::Builder::new(executor);
                    let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), service);
                    if let Err(e) = watcher.watch(conn).await {
                        debug!(%protocol, %remote, error = %e, "connection closed with error");
                    }
                });
            }
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            _ = &mut signal => break,
        }
    }

    // Refuse new connections while the open ones finish
    drop(listener);
    debug!(%protocol, open = connections.len(), "{} draining connections", protocol);

    graceful.shutdown().await;
    while connections.join_next().await.is_some() {}

    Ok(())
}
