//! Partition-key derivation policies for forwarded datagrams.

use std::net::SocketAddr;

/// Derives the broker partition key for one datagram.
///
/// The key steers message-to-partition assignment; any per-key ordering is
/// the broker's guarantee, never this crate's.
pub trait KeyPolicy: Send + Sync {
    fn partition_key(&self, sender: SocketAddr, payload: &str) -> String;
}

/// Keys each message by the textual sender IP address.
///
/// This is the default policy: all datagrams from one device land on one
/// partition without inspecting the payload.
pub struct SenderIpKey;

impl KeyPolicy for SenderIpKey {
    fn partition_key(&self, sender: SocketAddr, _payload: &str) -> String {
        sender.ip().to_string()
    }
}

/// Keys each message by the leading payload token.
///
/// The token is everything before the first `separator`; a payload without a
/// separator is used whole. An empty token falls back to the sender IP so a
/// malformed datagram still lands on a stable partition.
pub struct DeviceIdKey {
    separator: char,
}

impl DeviceIdKey {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }
}

impl Default for DeviceIdKey {
    fn default() -> Self {
        Self::new(':')
    }
}

impl KeyPolicy for DeviceIdKey {
    fn partition_key(&self, sender: SocketAddr, payload: &str) -> String {
        match payload.split(self.separator).next().map(str::trim) {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => sender.ip().to_string(),
        }
    }
}
