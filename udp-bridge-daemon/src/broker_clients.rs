//! Broker-client construction for the daemon's configured modes.

use crate::config::{BrokerClientMode, BrokerSection};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;
use udp_bridge::{BrokerClient, PublishError};

/// In-process client that acknowledges and logs every publish.
///
/// Stands in for a real broker during local bring-up and demos.
pub(crate) struct LoopbackBrokerClient {
    published: AtomicU64,
}

impl LoopbackBrokerClient {
    pub(crate) fn new() -> Self {
        Self {
            published: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl BrokerClient for LoopbackBrokerClient {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: Vec<u8>,
    ) -> Result<(), PublishError> {
        let seq = self.published.fetch_add(1, Ordering::Relaxed);
        info!(
            component = "loopback_broker",
            seq,
            topic,
            key,
            len = payload.len(),
            "acknowledged publish"
        );
        Ok(())
    }
}

/// Builds the broker client selected by configuration.
pub(crate) fn build(config: &BrokerSection) -> Result<Arc<dyn BrokerClient>, BrokerBuildError> {
    match config.client {
        BrokerClientMode::Loopback => Ok(Arc::new(LoopbackBrokerClient::new())),
        // Reserved until a registry Kafka client lands; external clients plug
        // in through the BrokerClient trait.
        BrokerClientMode::Kafka => Err(BrokerBuildError::KafkaDeferred {
            address: config.address.clone(),
        }),
    }
}

/// Failures constructing the configured broker client.
#[derive(Debug)]
pub(crate) enum BrokerBuildError {
    KafkaDeferred { address: String },
}

impl Display for BrokerBuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BrokerBuildError::KafkaDeferred { address } => write!(
                f,
                "kafka client integration is deferred (configured broker {address}); \
                 select the loopback client or inject a BrokerClient implementation"
            ),
        }
    }
}

impl Error for BrokerBuildError {}

#[cfg(test)]
mod tests {
    use super::{build, LoopbackBrokerClient};
    use crate::config::{BrokerClientMode, BrokerSection};
    use udp_bridge::BrokerClient;

    #[tokio::test]
    async fn loopback_client_acknowledges_every_publish() {
        let client = LoopbackBrokerClient::new();

        let first = client
            .publish("sensors", "10.0.0.5", b"temp:21.5".to_vec())
            .await;
        let second = client.publish("sensors", "10.0.0.5", Vec::new()).await;

        assert!(first.is_ok());
        assert!(second.is_ok());
    }

    #[test]
    fn kafka_mode_fails_fast_with_the_configured_address() {
        let config = BrokerSection {
            address: "kafka-0:9092".to_string(),
            client: BrokerClientMode::Kafka,
        };

        let error = build(&config).err().expect("kafka mode is reserved");
        assert!(error.to_string().contains("kafka-0:9092"));
    }
}
