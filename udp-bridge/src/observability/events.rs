//! Canonical structured event names used across `udp-bridge`.

// Listener lifecycle events.
pub const LISTENER_SCHEDULED: &str = "listener_scheduled";
pub const LISTENER_START: &str = "listener_start";
pub const LISTENER_STOP_REQUESTED: &str = "listener_stop_requested";
pub const LISTENER_STOP: &str = "listener_stop";

// Ingress and publish hand-off events.
pub const INGRESS_RECEIVE: &str = "ingress_receive";
pub const INGRESS_RECEIVE_FAILED: &str = "ingress_receive_failed";
pub const PUBLISH_OK: &str = "publish_ok";
pub const PUBLISH_FAILED: &str = "publish_failed";

// Startup probe events.
pub const PROBE_ATTEMPT_FAILED: &str = "probe_attempt_failed";
pub const PROBE_CONFIRMED: &str = "probe_confirmed";
pub const PROBE_EXHAUSTED: &str = "probe_exhausted";
pub const PROBE_ABORTED: &str = "probe_aborted";
