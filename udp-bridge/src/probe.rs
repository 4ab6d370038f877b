/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Startup readiness probe: bounded, strictly sequential broker reachability
//! checks run once during process initialization.

use crate::broker::BrokerClient;
use crate::observability::events;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};

const COMPONENT: &str = "startup_probe";
const SENTINEL_KEY: &str = "probe";
const SENTINEL_PAYLOAD: &[u8] = b"ready-check";

/// Probe schedule: attempt budget, backoff between attempts, per-attempt wait.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub topic: String,
    pub max_attempts: u32,
    pub backoff: Duration,
    pub attempt_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            topic: "sensors".to_string(),
            max_attempts: 10,
            backoff: Duration::from_secs(2),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

/// How one probe run ended. Exhaustion is reported, never process-fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The broker acknowledged the sentinel publish.
    Confirmed { attempts: u32 },
    /// Every attempt in the budget failed; the service starts anyway.
    Exhausted { attempts: u32 },
    /// Shutdown was requested while waiting to retry.
    Aborted { attempts: u32 },
}

/// Retrying reachability check using the same broker client as the listener.
pub struct StartupProbe {
    config: ProbeConfig,
    client: Arc<dyn BrokerClient>,
}

impl StartupProbe {
    pub fn new(config: ProbeConfig, client: Arc<dyn BrokerClient>) -> Self {
        Self { config, client }
    }

    /// Runs the probe to completion, racing each retry backoff against
    /// `shutdown`. Attempts never overlap.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> ProbeOutcome {
        for attempt in 1..=self.config.max_attempts {
            let publish = self.client.publish(
                &self.config.topic,
                SENTINEL_KEY,
                SENTINEL_PAYLOAD.to_vec(),
            );

            let cause = match timeout(self.config.attempt_timeout, publish).await {
                Ok(Ok(())) => {
                    info!(
                        event = events::PROBE_CONFIRMED,
                        component = COMPONENT,
                        attempt,
                        topic = self.config.topic.as_str(),
                        "broker reachability confirmed"
                    );
                    return ProbeOutcome::Confirmed { attempts: attempt };
                }
                Ok(Err(err)) => err.to_string(),
                Err(_) => format!(
                    "no acknowledgment within {:?}",
                    self.config.attempt_timeout
                ),
            };

            warn!(
                event = events::PROBE_ATTEMPT_FAILED,
                component = COMPONENT,
                attempt,
                max_attempts = self.config.max_attempts,
                cause = cause.as_str(),
                "probe attempt failed"
            );

            if attempt < self.config.max_attempts {
                tokio::select! {
                    _ = shutdown.changed() => {
                        info!(
                            event = events::PROBE_ABORTED,
                            component = COMPONENT,
                            attempt,
                            "shutdown requested; abandoning remaining attempts"
                        );
                        return ProbeOutcome::Aborted { attempts: attempt };
                    }
                    _ = sleep(self.config.backoff) => {}
                }
            }
        }

        error!(
            event = events::PROBE_EXHAUSTED,
            component = COMPONENT,
            attempts = self.config.max_attempts,
            "attempt budget exhausted; starting without confirmed connectivity"
        );
        ProbeOutcome::Exhausted {
            attempts: self.config.max_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ProbeConfig, ProbeOutcome, StartupProbe};
    use crate::broker::{BrokerClient, PublishError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;

    /// Fails the first `failures` publishes, acknowledges afterwards.
    struct ScriptedClient {
        failures: u32,
        attempts: AtomicU32,
    }

    impl ScriptedClient {
        fn failing_first(failures: u32) -> Self {
            Self {
                failures,
                attempts: AtomicU32::new(0),
            }
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl BrokerClient for ScriptedClient {
        async fn publish(
            &self,
            _topic: &str,
            _key: &str,
            _payload: Vec<u8>,
        ) -> Result<(), PublishError> {
            let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
            if attempt <= self.failures {
                Err(PublishError::new("broker unavailable"))
            } else {
                Ok(())
            }
        }
    }

    /// Never resolves; forces the per-attempt timeout path.
    struct StalledClient;

    #[async_trait]
    impl BrokerClient for StalledClient {
        async fn publish(
            &self,
            _topic: &str,
            _key: &str,
            _payload: Vec<u8>,
        ) -> Result<(), PublishError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn probe_confirms_on_fourth_attempt_with_two_second_spacing() {
        let client = Arc::new(ScriptedClient::failing_first(3));
        let probe = StartupProbe::new(ProbeConfig::default(), client.clone());
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let started = tokio::time::Instant::now();
        let outcome = probe.run(shutdown_rx).await;

        assert_eq!(outcome, ProbeOutcome::Confirmed { attempts: 4 });
        assert_eq!(client.attempts(), 4);
        // Three backoffs of 2s each separate the four attempts.
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn probe_exhausts_the_full_budget_without_failing() {
        let client = Arc::new(ScriptedClient::failing_first(u32::MAX));
        let probe = StartupProbe::new(ProbeConfig::default(), client.clone());
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let outcome = probe.run(shutdown_rx).await;

        assert_eq!(outcome, ProbeOutcome::Exhausted { attempts: 10 });
        assert_eq!(client.attempts(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn probe_counts_a_timed_out_attempt_as_a_failure() {
        let config = ProbeConfig {
            max_attempts: 2,
            ..ProbeConfig::default()
        };
        let probe = StartupProbe::new(config, Arc::new(StalledClient));
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let started = tokio::time::Instant::now();
        let outcome = probe.run(shutdown_rx).await;

        assert_eq!(outcome, ProbeOutcome::Exhausted { attempts: 2 });
        // Two 10s attempt timeouts plus one 2s backoff.
        assert_eq!(started.elapsed(), Duration::from_secs(22));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_during_backoff_aborts_remaining_attempts() {
        let client = Arc::new(ScriptedClient::failing_first(u32::MAX));
        let probe = StartupProbe::new(ProbeConfig::default(), client.clone());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        shutdown_tx
            .send(true)
            .expect("receiver is still held by the test");

        let outcome = probe.run(shutdown_rx).await;

        assert_eq!(outcome, ProbeOutcome::Aborted { attempts: 1 });
        assert_eq!(client.attempts(), 1);
    }
}
