//! Broker-client seam: asynchronous publish onto a distributed log/broker.

use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Publish interface onto the messaging backend.
///
/// `Ok(())` is the broker acknowledgment. Implementations own their
/// transport, serialization, and per-key ordering guarantees; the bridge
/// treats them as a black box. The same call serves both the listener's
/// fire-and-forget hand-off and the probe's bounded synchronous wait.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    async fn publish(&self, topic: &str, key: &str, payload: Vec<u8>)
        -> Result<(), PublishError>;
}

/// Failure reported by a [`BrokerClient`] for one publish.
#[derive(Debug)]
pub struct PublishError {
    message: String,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl PublishError {
    /// Creates an error carrying only a description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error chaining the underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl Display for PublishError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {source}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Error for PublishError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn Error + 'static))
    }
}
