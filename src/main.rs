//! # Chat Core API
//!
//! Entry point. Initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - PostgreSQL pool and Redis client
//! - HTTP and gRPC servers

use anyhow::Result;
use tracing::{error, info};

use chat_core_api::config::Settings;
use chat_core_api::startup::{shutdown_signal, Application, Lifecycle, Phase};

#[tokio::main]
async fn main() -> Result<()> {
    chat_core_api::telemetry::init_tracing();

    let span = tracing::info_span!("chat_core_api");
    let mut lifecycle = Lifecycle::new(span.clone());

    // Configuration errors are fatal
    let settings = Settings::load()?;
    info!(
        parent: &span,
        host = %settings.server.host,
        http_port = settings.server.http_port,
        grpc_port = settings.server.grpc_port,
        environment = %settings.environment,
        "Configuration loaded"
    );
    lifecycle.advance(Phase::ConfigLoaded);

    // A store outage ends this attempt without an error exit; restarts are
    // left to the process manager
    let application = match Application::build(settings, lifecycle).await {
        Ok(application) => application,
        Err(e) => {
            error!(parent: &span, error = %e, "Startup aborted");
            return Ok(());
        }
    };

    let report = application.run_until(shutdown_signal()).await?;
    info!(parent: &span, clean = report.is_clean(), "Chat Core API stopped");

    Ok(())
}
