//! Listener doubles for supervisor tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use chat_core_api::server::{Listener, Protocol, ServerError};

/// Ordered log of what the doubles did, e.g. `["bind:http", "drain:grpc"]`.
#[derive(Clone, Default)]
pub struct Events(Arc<Mutex<Vec<String>>>);

impl Events {
    fn push(&self, event: String) {
        self.0.lock().unwrap().push(event);
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }
}

/// What a double does once asked to stop.
#[derive(Clone, Copy)]
pub enum Drain {
    Graceful,
    Fail,
    Hang,
}

pub struct FakeListener {
    protocol: Protocol,
    bind_delay: Option<Duration>,
    fail_bind: bool,
    drain: Drain,
    events: Events,
}

impl FakeListener {
    pub fn new(protocol: Protocol, events: &Events) -> Self {
        Self {
            protocol,
            bind_delay: None,
            fail_bind: false,
            drain: Drain::Graceful,
            events: events.clone(),
        }
    }

    pub fn bind_delay(mut self, delay: Duration) -> Self {
        self.bind_delay = Some(delay);
        self
    }

    pub fn fail_bind(mut self) -> Self {
        self.fail_bind = true;
        self
    }

    pub fn drain(mut self, drain: Drain) -> Self {
        self.drain = drain;
        self
    }

    pub fn boxed(self) -> Box<dyn Listener> {
        Box::new(self)
    }
}

#[async_trait]
impl Listener for FakeListener {
    fn protocol(&self) -> Protocol {
        self.protocol
    }

    fn address(&self) -> &str {
        "127.0.0.1:0"
    }

    async fn bind(&self) -> std::io::Result<TcpListener> {
        if let Some(delay) = self.bind_delay {
            tokio::time::sleep(delay).await;
        }
        self.events.push(format!("bind:{}", self.protocol.as_str()));
        if self.fail_bind {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                "address already in use",
            ));
        }
        TcpListener::bind(self.address()).await
    }

    async fn serve(
        self: Box<Self>,
        _listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), ServerError> {
        shutdown.cancelled().await;
        self.events.push(format!("drain:{}", self.protocol.as_str()));

        match self.drain {
            Drain::Graceful => Ok(()),
            Drain::Fail => Err(ServerError::serve(self.protocol, "simulated drain failure")),
            Drain::Hang => std::future::pending().await,
        }
    }
}
