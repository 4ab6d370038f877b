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

//! Forwarder facade: lifecycle of one UDP listener and its ingress worker.

use crate::broker::BrokerClient;
use crate::data_plane::ingress_loop::{self, IngressContext};
use crate::keying::{KeyPolicy, SenderIpKey};
use crate::observability::events;
use crate::runtime::worker_runtime::{
    spawn_ingress_loop, IngressLoopHandle, DEFAULT_INGRESS_RUNTIME_THREAD_NAME,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

const COMPONENT: &str = "forwarder";
const INGRESS_RUNTIME_THREAD_NAME_PREFIX: &str = "udp-in-";
const INGRESS_RUNTIME_THREAD_NAME_MAX_LEN: usize = 15;

/// Listener configuration: bind port and destination topic.
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    pub port: u16,
    pub topic: String,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            topic: "sensors".to_string(),
        }
    }
}

/// Failures starting the listener. Fatal to the listener only; the probe and
/// the rest of the process are unaffected.
#[derive(Debug)]
pub enum StartError {
    /// The UDP socket could not be bound on the configured port.
    Bind(io::Error),
    /// The ingress worker thread could not be spawned.
    Spawn(io::Error),
    /// The forwarder already owns a running listener.
    AlreadyRunning,
}

impl Display for StartError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StartError::Bind(err) => write!(f, "failed to bind UDP socket: {err}"),
            StartError::Spawn(err) => write!(f, "failed to spawn ingress worker: {err}"),
            StartError::AlreadyRunning => write!(f, "listener is already running"),
        }
    }
}

impl Error for StartError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StartError::Bind(err) | StartError::Spawn(err) => Some(err),
            StartError::AlreadyRunning => None,
        }
    }
}

/// State owned while a listener is scheduled.
struct RunningListener {
    local_addr: SocketAddr,
    stop_tx: watch::Sender<bool>,
    worker: IngressLoopHandle,
}

/// Bridges one UDP socket onto a broker topic through an injected
/// [`BrokerClient`].
///
/// At most one listener runs per forwarder. [`UdpForwarder::start`] never
/// blocks; [`UdpForwarder::stop`] is idempotent, fire-and-forget, and safe
/// when `start` failed or was never called.
pub struct UdpForwarder {
    config: ForwarderConfig,
    client: Arc<dyn BrokerClient>,
    key_policy: Arc<dyn KeyPolicy>,
    listener: Option<RunningListener>,
}

impl UdpForwarder {
    /// Creates a forwarder keyed by the textual sender IP address.
    pub fn new(config: ForwarderConfig, client: Arc<dyn BrokerClient>) -> Self {
        Self::with_key_policy(config, client, Arc::new(SenderIpKey))
    }

    /// Creates a forwarder with an explicit key-derivation policy.
    pub fn with_key_policy(
        config: ForwarderConfig,
        client: Arc<dyn BrokerClient>,
        key_policy: Arc<dyn KeyPolicy>,
    ) -> Self {
        Self {
            config,
            client,
            key_policy,
            listener: None,
        }
    }

    /// Binds the UDP socket and schedules the ingress worker, returning
    /// immediately. The worker owns the socket until it exits.
    pub fn start(&mut self) -> Result<(), StartError> {
        if self.listener.is_some() {
            return Err(StartError::AlreadyRunning);
        }

        let socket = std::net::UdpSocket::bind((Ipv4Addr::UNSPECIFIED, self.config.port))
            .map_err(StartError::Bind)?;
        socket.set_nonblocking(true).map_err(StartError::Bind)?;
        let local_addr = socket.local_addr().map_err(StartError::Bind)?;

        let worker_id = Uuid::new_v4().to_string();
        let (stop_tx, stop_rx) = watch::channel(false);
        let context = IngressContext {
            worker_id: worker_id.clone(),
            topic: self.config.topic.clone(),
            key_policy: self.key_policy.clone(),
            client: self.client.clone(),
        };

        let thread_name = Self::build_runtime_thread_name(&worker_id);
        let worker = spawn_ingress_loop(thread_name, move || {
            ingress_loop::ingress_receive_loop(context, socket, stop_rx)
        })
        .map_err(StartError::Spawn)?;

        debug!(
            event = events::LISTENER_SCHEDULED,
            component = COMPONENT,
            worker_id = worker_id.as_str(),
            worker_thread = worker.worker_thread(),
            local_addr = %local_addr,
            "ingress worker scheduled"
        );

        self.listener = Some(RunningListener {
            local_addr,
            stop_tx,
            worker,
        });

        Ok(())
    }

    /// Address the listener socket is bound to while a listener is scheduled.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(|listener| listener.local_addr)
    }

    /// True while a listener is scheduled and its worker has not exited.
    pub fn is_running(&self) -> bool {
        self.listener
            .as_ref()
            .map(|listener| !listener.worker.is_finished())
            .unwrap_or(false)
    }

    /// Signals the ingress worker to stop and release the socket.
    ///
    /// Fire-and-forget: the worker observes the signal, exits its receive,
    /// and closes the socket on its own thread. Never waits for the worker.
    pub fn stop(&mut self) {
        let Some(listener) = self.listener.take() else {
            debug!(
                event = events::LISTENER_STOP_REQUESTED,
                component = COMPONENT,
                "stop requested with no running listener"
            );
            return;
        };

        // Err means the worker already exited and dropped its receiver.
        let _ = listener.stop_tx.send(true);

        info!(
            event = events::LISTENER_STOP_REQUESTED,
            component = COMPONENT,
            worker_thread = listener.worker.worker_thread(),
            local_addr = %listener.local_addr,
            "listener stop requested"
        );
    }

    fn build_runtime_thread_name(worker_id: &str) -> String {
        let suffix_len =
            INGRESS_RUNTIME_THREAD_NAME_MAX_LEN - INGRESS_RUNTIME_THREAD_NAME_PREFIX.len();
        let suffix: String = worker_id
            .chars()
            .filter(|ch| ch.is_ascii_hexdigit())
            .take(suffix_len)
            .collect();

        if suffix.len() == suffix_len {
            format!("{INGRESS_RUNTIME_THREAD_NAME_PREFIX}{suffix}")
        } else {
            DEFAULT_INGRESS_RUNTIME_THREAD_NAME.to_string()
        }
    }
}
