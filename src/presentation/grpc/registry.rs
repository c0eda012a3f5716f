//! gRPC Service Registry

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tonic::service::RoutesBuilder;

/// A gRPC service that can mount itself on the server routes.
pub trait GrpcService: Send + Sync {
    /// Fully qualified service name, e.g. `chat.v1.ChatService`.
    fn name(&self) -> &'static str;

    fn register(&self, routes: &mut RoutesBuilder);
}

/// Service name to handle. Built once at startup, read-only afterwards.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<&'static str, Arc<dyn GrpcService>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service. A later service with the same name replaces the
    /// earlier one.
    pub fn with(mut self, service: impl GrpcService + 'static) -> Self {
        self.services.insert(service.name(), Arc::new(service));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.services.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Arc<dyn GrpcService>)> + '_ {
        self.services.iter().map(|(name, service)| (*name, service))
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
