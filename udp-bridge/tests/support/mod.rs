use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use udp_bridge::{BrokerClient, PublishError};

/// One observed publish call, in submission order.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub(crate) struct PublishRecord {
    pub(crate) topic: String,
    pub(crate) key: String,
    pub(crate) payload: String,
    pub(crate) accepted: bool,
}

/// Broker client that records every publish; optionally rejects payloads
/// containing a marker so failure-isolation behavior can be observed.
pub(crate) struct RecordingBrokerClient {
    reject_payloads_containing: Option<String>,
    records: Mutex<Vec<PublishRecord>>,
}

impl RecordingBrokerClient {
    pub(crate) fn acknowledging() -> Self {
        Self {
            reject_payloads_containing: None,
            records: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub(crate) fn rejecting_payloads_containing(marker: &str) -> Self {
        Self {
            reject_payloads_containing: Some(marker.to_string()),
            records: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub(crate) fn records(&self) -> Vec<PublishRecord> {
        self.records
            .lock()
            .expect("records mutex should not be poisoned")
            .clone()
    }

    pub(crate) fn publish_count(&self) -> usize {
        self.records
            .lock()
            .expect("records mutex should not be poisoned")
            .len()
    }
}

#[async_trait]
impl BrokerClient for RecordingBrokerClient {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: Vec<u8>,
    ) -> Result<(), PublishError> {
        let payload = String::from_utf8_lossy(&payload).into_owned();
        let accepted = self
            .reject_payloads_containing
            .as_deref()
            .map(|marker| !payload.contains(marker))
            .unwrap_or(true);

        self.records
            .lock()
            .expect("records mutex should not be poisoned")
            .push(PublishRecord {
                topic: topic.to_string(),
                key: key.to_string(),
                payload,
                accepted,
            });

        if accepted {
            Ok(())
        } else {
            Err(PublishError::new("rejected by test broker"))
        }
    }
}

/// Polls `predicate` until it holds or a five-second budget elapses.
pub(crate) async fn eventually<F>(what: &str, predicate: F)
where
    F: Fn() -> bool,
{
    for _ in 0..100 {
        if predicate() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("timed out waiting for {what}");
}
