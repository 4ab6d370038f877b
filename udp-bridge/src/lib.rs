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

//! # udp-bridge
//!
//! `udp-bridge` ingests UDP datagrams from sensor devices and republishes each
//! one as a message on a broker topic through a pluggable [`BrokerClient`].
//! It bridges an unreliable, connectionless transport onto an ordered, durable
//! messaging backend: at-most-once, best-effort delivery is the explicit
//! contract. There is no buffering, no per-message retry, and no backpressure
//! from the broker toward the UDP source.
//!
//! Typical usage is API-first and centered on [`UdpForwarder`] and
//! [`StartupProbe`]: construct both with an already-built broker client, run
//! the probe once during initialization, and keep the forwarder running for
//! the life of the service.
//!
//! ```
//! use std::sync::Arc;
//! use udp_bridge::{BrokerClient, ForwarderConfig, UdpForwarder};
//!
//! # pub mod noop_client {
//! #     use async_trait::async_trait;
//! #     use udp_bridge::{BrokerClient, PublishError};
//! #
//! #     pub struct NoopClient;
//! #
//! #     #[async_trait]
//! #     impl BrokerClient for NoopClient {
//! #         async fn publish(
//! #             &self,
//! #             _topic: &str,
//! #             _key: &str,
//! #             _payload: Vec<u8>,
//! #         ) -> Result<(), PublishError> {
//! #             Ok(())
//! #         }
//! #     }
//! # }
//!
//! let client: Arc<dyn BrokerClient> = Arc::new(noop_client::NoopClient);
//! let config = ForwarderConfig {
//!     port: 0,
//!     topic: "sensors".to_string(),
//! };
//!
//! let mut forwarder = UdpForwarder::new(config, client);
//! forwarder.start().expect("bind on an ephemeral port should succeed");
//! forwarder.stop();
//! forwarder.stop(); // idempotent
//! ```
//!
//! ## Internal architecture map
//!
//! - API facade: outward [`UdpForwarder`] / [`StartupProbe`] surface
//! - Data plane: the ingress receive loop and its publish hand-off
//! - Runtime: the dedicated worker thread hosting the ingress loop
//! - Keying: pluggable partition-key derivation policies
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events. Library code emits
//! events/spans and does not unconditionally initialize a global subscriber.
//! Binaries and tests are responsible for one-time `tracing_subscriber`
//! initialization at process boundaries.

mod broker;
pub use broker::{BrokerClient, PublishError};

mod keying;
pub use keying::{DeviceIdKey, KeyPolicy, SenderIpKey};

mod forwarder;
pub use forwarder::{ForwarderConfig, StartError, UdpForwarder};

mod probe;
pub use probe::{ProbeConfig, ProbeOutcome, StartupProbe};

mod data_plane;
mod runtime;

#[doc(hidden)]
pub mod observability;
