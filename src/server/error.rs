//! Server Errors

use super::Protocol;

/// Boxed error from a protocol stack (hyper, tonic transport, ...)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Supervisor and listener errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{protocol} listener failed to bind {address}: {source}")]
    Bind {
        protocol: Protocol,
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{protocol} listener stopped before binding")]
    NeverBound { protocol: Protocol },

    #[error("{protocol} listener failed while serving: {source}")]
    Serve {
        protocol: Protocol,
        #[source]
        source: BoxError,
    },

    #[error("{protocol} service registration failed: {message}")]
    Registration { protocol: Protocol, message: String },

    #[error("Server already started")]
    AlreadyStarted,

    #[error("Server is not running")]
    NotRunning,
}

impl ServerError {
    pub fn serve(protocol: Protocol, source: impl Into<BoxError>) -> Self {
        ServerError::Serve {
            protocol,
            source: source.into(),
        }
    }
}
