//! Ingress receive loop: datagram intake, decode, key derivation, publish hand-off.

use crate::broker::BrokerClient;
use crate::keying::KeyPolicy;
use crate::observability::{events, fields::WorkerContext};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{debug, error, info};

const COMPONENT: &str = "ingress_loop";

/// Largest body one UDP datagram can carry.
pub(crate) const MAX_DATAGRAM_LEN: usize = 65_535;

/// Everything the receive loop needs beyond the socket and the stop signal.
pub(crate) struct IngressContext {
    pub(crate) worker_id: String,
    pub(crate) topic: String,
    pub(crate) key_policy: Arc<dyn KeyPolicy>,
    pub(crate) client: Arc<dyn BrokerClient>,
}

/// Receives datagrams until stopped, handing each off to the broker client
/// without waiting for the publish to complete.
///
/// The socket is exclusively owned here while the loop runs and is closed by
/// dropping it on exit, whichever way the loop ends.
pub(crate) async fn ingress_receive_loop(
    context: IngressContext,
    socket: std::net::UdpSocket,
    mut stop: watch::Receiver<bool>,
) {
    let worker = WorkerContext::with_current_thread(context.worker_id.clone());

    let socket = match UdpSocket::from_std(socket) {
        Ok(socket) => socket,
        Err(err) => {
            error!(
                event = events::INGRESS_RECEIVE_FAILED,
                component = COMPONENT,
                worker_id = worker.worker_id.as_str(),
                worker_thread = worker.worker_thread.as_str(),
                err = ?err,
                "unable to register socket with the worker runtime"
            );
            return;
        }
    };

    info!(
        event = events::LISTENER_START,
        component = COMPONENT,
        worker_id = worker.worker_id.as_str(),
        worker_thread = worker.worker_thread.as_str(),
        local_addr = ?socket.local_addr().ok(),
        topic = context.topic.as_str(),
        "UDP listener started"
    );

    let mut buf = vec![0u8; MAX_DATAGRAM_LEN];

    loop {
        tokio::select! {
            // Also taken when the forwarder is dropped and the sender goes away.
            _ = stop.changed() => {
                info!(
                    event = events::LISTENER_STOP,
                    component = COMPONENT,
                    worker_id = worker.worker_id.as_str(),
                    worker_thread = worker.worker_thread.as_str(),
                    "stop requested; closing socket"
                );
                break;
            }
            received = socket.recv_from(&mut buf) => {
                match received {
                    Ok((len, sender)) => {
                        handle_datagram(&context, &worker, &buf[..len], sender);
                    }
                    Err(err) => {
                        error!(
                            event = events::INGRESS_RECEIVE_FAILED,
                            component = COMPONENT,
                            worker_id = worker.worker_id.as_str(),
                            worker_thread = worker.worker_thread.as_str(),
                            err = ?err,
                            "receive failed; terminating loop"
                        );
                        break;
                    }
                }
            }
        }
    }
}

/// Decodes one datagram and submits the publish with a log-only completion
/// observer. Never blocks the next receive on broker latency.
fn handle_datagram(
    context: &IngressContext,
    worker: &WorkerContext,
    datagram: &[u8],
    sender: SocketAddr,
) {
    // Malformed UTF-8 yields replacement characters, never a dropped datagram.
    let payload = String::from_utf8_lossy(datagram).into_owned();
    let key = context.key_policy.partition_key(sender, &payload);

    debug!(
        event = events::INGRESS_RECEIVE,
        component = COMPONENT,
        worker_id = worker.worker_id.as_str(),
        sender = %sender,
        len = datagram.len(),
        key = key.as_str(),
        "received datagram"
    );

    let client = context.client.clone();
    let topic = context.topic.clone();
    let worker_id = worker.worker_id.clone();

    // Completion observers only log; they never touch listener state.
    tokio::spawn(async move {
        match client.publish(&topic, &key, payload.into_bytes()).await {
            Ok(()) => {
                debug!(
                    event = events::PUBLISH_OK,
                    component = COMPONENT,
                    worker_id = worker_id.as_str(),
                    topic = topic.as_str(),
                    key = key.as_str(),
                    "publish acknowledged"
                );
            }
            Err(err) => {
                error!(
                    event = events::PUBLISH_FAILED,
                    component = COMPONENT,
                    worker_id = worker_id.as_str(),
                    topic = topic.as_str(),
                    key = key.as_str(),
                    err = %err,
                    "publish failed; dropping message"
                );
            }
        }
    });
}
