//! Process Lifecycle Tests

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use tokio::sync::oneshot;
use tracing::Span;

use chat_core_api::infrastructure::StoreError;
use chat_core_api::server::{DrainOutcome, Protocol, Server};
use chat_core_api::startup::{serve_until, Application, Lifecycle, Phase, StartupError};

use crate::common::listeners::{Events, FakeListener};
use crate::common::test_settings;

fn fake_server(events: &Events) -> Server {
    Server::new(
        FakeListener::new(Protocol::Http, events).boxed(),
        FakeListener::new(Protocol::Grpc, events).boxed(),
        Duration::from_secs(5),
        Span::none(),
    )
}

#[tokio::test]
async fn test_signal_triggers_single_ordered_shutdown() {
    let events = Events::default();
    let (tx, rx) = oneshot::channel::<()>();
    let mut lifecycle = Lifecycle::new(Span::none());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = tx.send(());
    });

    let report = serve_until(
        fake_server(&events),
        async {
            let _ = rx.await;
        },
        &mut lifecycle,
    )
    .await
    .unwrap();

    assert_eq!(lifecycle.phase(), Phase::ShuttingDown);
    assert_eq!(events.with_prefix("drain:"), vec!["drain:http", "drain:grpc"]);
    assert_eq!(report.listeners.len(), 2);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_signal_before_listeners_bind() {
    let events = Events::default();
    let server = Server::new(
        FakeListener::new(Protocol::Http, &events)
            .bind_delay(Duration::from_secs(10))
            .boxed(),
        FakeListener::new(Protocol::Grpc, &events).boxed(),
        Duration::from_secs(5),
        Span::none(),
    );
    let mut lifecycle = Lifecycle::new(Span::none());

    let started = Instant::now();
    let report = serve_until(server, async {}, &mut lifecycle).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(report.outcome(Protocol::Http), Some(&DrainOutcome::NotRunning));
    assert_eq!(lifecycle.phase(), Phase::ShuttingDown);
}

#[tokio::test]
async fn test_store_failure_aborts_startup_cleanly() {
    let mut lifecycle = Lifecycle::new(Span::none());
    lifecycle.advance(Phase::ConfigLoaded);

    let result = Application::build(test_settings(), lifecycle).await;

    assert!(matches!(
        result,
        Err(StartupError::Stores(StoreError::Database(_)))
    ));
}
