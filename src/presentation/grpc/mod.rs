//! gRPC Adapter
//!
//! Services are collected in a [`ServiceRegistry`] and turned into tonic
//! routes by [`build_routes`]. Reflection and `grpc.health.v1` are always
//! mounted next to them, and every call goes through the gRPC trace layer.

mod chat;
mod registry;

pub use chat::ChatGrpcService;
pub use registry::{GrpcService, ServiceRegistry};

use axum::Router;
use tonic::service::RoutesBuilder;
use tonic_health::server::HealthReporter;
use tonic_health::ServingStatus;
use tracing::{debug, info};

use crate::presentation::middleware::logging;
use crate::server::{Protocol, ServerError};

/// Generated protobuf types and service stubs.
pub mod proto {
    tonic::include_proto!("chat.v1");

    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("chat_descriptor");
}

/// Everything the gRPC listener needs to serve.
pub struct GrpcRoutes {
    pub router: Router,
    pub health: HealthHandle,
}

/// Health reporter for the mounted services.
pub struct HealthHandle {
    reporter: HealthReporter,
    services: Vec<&'static str>,
}

impl HealthHandle {
    /// Report every registered service, and the server as a whole, as
    /// not serving.
    pub async fn mark_not_serving(&self) {
        for name in self.services.iter().copied().chain([""]) {
            self.reporter
                .set_service_status(name, ServingStatus::NotServing)
                .await;
        }
    }
}

/// Mount the registered services plus reflection and health checks.
pub async fn build_routes(registry: &ServiceRegistry) -> Result<GrpcRoutes, ServerError> {
    let mut builder = RoutesBuilder::default();

    for (name, service) in registry.iter() {
        service.register(&mut builder);
        debug!(service = name, "gRPC service registered");
    }

    let reflection = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(proto::FILE_DESCRIPTOR_SET)
        .register_encoded_file_descriptor_set(tonic_health::pb::FILE_DESCRIPTOR_SET)
        .build_v1()
        .map_err(|e| ServerError::Registration {
            protocol: Protocol::Grpc,
            message: format!("Failed to build reflection service: {}", e),
        })?;
    builder.add_service(reflection);

    let (reporter, health_service) = tonic_health::server::health_reporter();
    for name in registry.names() {
        reporter
            .set_service_status(name, ServingStatus::Serving)
            .await;
    }
    builder.add_service(health_service);

    info!(
        services = registry.names().count(),
        "gRPC routes built with reflection and health services"
    );

    let router = builder
        .routes()
        .into_axum_router()
        .layer(logging::create_grpc_trace_layer());

    Ok(GrpcRoutes {
        router,
        health: HealthHandle {
            reporter,
            services: registry.names().collect(),
        },
    })
}
