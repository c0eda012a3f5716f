//! gRPC API Tests
//!
//! Run the real supervisor with both real listeners on ephemeral ports.

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use tonic::transport::Channel;
use tonic::Code;
use tower::ServiceExt;
use tracing::{Level, Span};

use chat_core_api::presentation::grpc::build_routes;
use chat_core_api::presentation::grpc::proto::chat_service_client::ChatServiceClient;
use chat_core_api::presentation::grpc::proto::{GetUserRequest, SendMessageRequest};
use chat_core_api::server::{DrainOutcome, Protocol, Server};
use chat_core_api::startup::build_server;

use crate::common::{test_settings, TestApp};

async fn start(app: &TestApp) -> (Server, SocketAddr) {
    let mut server = build_server(&test_settings(), app.deps.clone(), Span::none())
        .await
        .unwrap();
    let ready = server.start().unwrap().wait().await;
    assert!(ready.iter().all(|r| r.is_ready()));

    let grpc = ready
        .iter()
        .find(|r| r.protocol == Protocol::Grpc)
        .and_then(|r| r.local_addr())
        .unwrap();
    (server, grpc)
}

#[tokio::test]
async fn test_get_user_over_grpc() {
    let app = TestApp::new();
    app.store.insert_user(7, "neo");
    let (mut server, addr) = start(&app).await;

    let mut client = ChatServiceClient::connect(format!("http://{}", addr))
        .await
        .unwrap();
    let user = client
        .get_user(GetUserRequest { user_id: 7 })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(user.login, "neo");

    let missing = client
        .get_user(GetUserRequest { user_id: 8 })
        .await
        .unwrap_err();
    assert_eq!(missing.code(), Code::NotFound);

    drop(client);
    let report = server.shutdown().await.unwrap();
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_send_to_unknown_recipient_over_grpc() {
    let app = TestApp::new();
    app.store.insert_user(1, "alice");
    let (mut server, addr) = start(&app).await;

    let mut client = ChatServiceClient::connect(format!("http://{}", addr))
        .await
        .unwrap();
    let status = client
        .send_message(SendMessageRequest {
            sender_id: 1,
            recipient_id: 42,
            text: "hello?".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "user with id 42 doesn't exist");

    drop(client);
    let report = server.shutdown().await.unwrap();
    assert_eq!(report.outcome(Protocol::Grpc), Some(&DrainOutcome::Drained));
}

#[tokio::test]
async fn test_grpc_health_reports_serving() {
    use tonic_health::pb::health_client::HealthClient;
    use tonic_health::pb::{health_check_response::ServingStatus, HealthCheckRequest};

    let app = TestApp::new();
    let (mut server, addr) = start(&app).await;

    let channel = Channel::from_shared(format!("http://{}", addr))
        .unwrap()
        .connect()
        .await
        .unwrap();
    let mut client = HealthClient::new(channel);
    let response = tokio::time::timeout(
        Duration::from_secs(5),
        client.check(HealthCheckRequest {
            service: "chat.v1.ChatService".into(),
        }),
    )
    .await
    .unwrap()
    .unwrap()
    .into_inner();
    assert_eq!(response.status(), ServingStatus::Serving);

    drop(client);
    server.shutdown().await.unwrap();
}

/// Log sink shared with a scoped subscriber.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_grpc_calls_are_traced() {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer({
            let logs = logs.clone();
            move || logs.clone()
        })
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = TestApp::new();
    let routes = build_routes(&app.deps.grpc).await.unwrap();
    let response = routes
        .router
        .oneshot(
            Request::post("/chat.v1.ChatService/Unknown")
                .header("content-type", "application/grpc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("grpc-status").map(|v| v.as_bytes()),
        Some(&b"12"[..])
    );

    let logs = logs.contents();
    assert!(logs.contains("/chat.v1.ChatService/Unknown"), "{logs}");
    assert!(logs.contains("finished processing request"), "{logs}");
}
