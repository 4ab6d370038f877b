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

//! Bridge daemon: config loading, broker-client wiring, probe, and the
//! forwarder lifecycle around process shutdown.

mod broker_clients;
mod config;

use crate::config::{Config, KeyPolicyMode};
use clap::Parser;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use udp_bridge::{
    BrokerClient, DeviceIdKey, ForwarderConfig, KeyPolicy, ProbeConfig, SenderIpKey,
    StartupProbe, UdpForwarder,
};

#[derive(Parser)]
#[command(about = "Bridges sensor UDP datagrams onto a broker topic")]
struct DaemonArgs {
    /// Path to a JSON5 configuration file; defaults apply when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = DaemonArgs::parse();
    let config = match args.config {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };

    let client: Arc<dyn BrokerClient> = broker_clients::build(&config.broker)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let key_policy: Arc<dyn KeyPolicy> = match config.listener.key_policy {
        KeyPolicyMode::SenderIp => Arc::new(SenderIpKey),
        KeyPolicyMode::DeviceId => Arc::new(DeviceIdKey::default()),
    };

    let mut forwarder = UdpForwarder::with_key_policy(
        ForwarderConfig {
            port: config.listener.udp_port,
            topic: config.listener.topic.clone(),
        },
        client.clone(),
        key_policy,
    );

    if let Err(err) = forwarder.start() {
        // Listener-fatal only: the probe still reports broker reachability.
        error!(err = %err, "unable to start UDP listener");
    }

    let probe = StartupProbe::new(
        ProbeConfig {
            topic: config.probe.topic.clone(),
            max_attempts: config.probe.max_attempts,
            backoff: config.probe.backoff(),
            attempt_timeout: config.probe.attempt_timeout(),
        },
        client.clone(),
    );
    // Outcomes, including exhaustion, are logged by the probe and are
    // deliberately non-fatal.
    probe.run(shutdown_rx.clone()).await;

    let mut shutdown = shutdown_rx;
    // Err means the signal task ended; treat it as shutdown.
    let _ = shutdown.changed().await;

    info!("shutting down");
    forwarder.stop();

    Ok(())
}
