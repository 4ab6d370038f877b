//! Daemon configuration: JSON5 file with serde defaults for every field.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields, default)]
pub(crate) struct Config {
    pub(crate) listener: ListenerSection,
    pub(crate) broker: BrokerSection,
    pub(crate) probe: ProbeSection,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields, default)]
pub(crate) struct ListenerSection {
    pub(crate) udp_port: u16,
    pub(crate) topic: String,
    pub(crate) key_policy: KeyPolicyMode,
}

impl Default for ListenerSection {
    fn default() -> Self {
        Self {
            udp_port: 8000,
            topic: "sensors".to_string(),
            key_policy: KeyPolicyMode::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum KeyPolicyMode {
    #[default]
    SenderIp,
    DeviceId,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields, default)]
pub(crate) struct BrokerSection {
    pub(crate) address: String,
    pub(crate) client: BrokerClientMode,
}

impl Default for BrokerSection {
    fn default() -> Self {
        Self {
            address: "broker:9092".to_string(),
            client: BrokerClientMode::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum BrokerClientMode {
    #[default]
    Loopback,
    Kafka,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields, default)]
pub(crate) struct ProbeSection {
    pub(crate) topic: String,
    pub(crate) max_attempts: u32,
    pub(crate) backoff_secs: u64,
    pub(crate) attempt_timeout_secs: u64,
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            topic: "sensors".to_string(),
            max_attempts: 10,
            backoff_secs: 2,
            attempt_timeout_secs: 10,
        }
    }
}

impl ProbeSection {
    pub(crate) fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub(crate) fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }
}

impl Config {
    /// Loads and parses a JSON5 configuration file.
    pub(crate) fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.to_string(),
            source: err,
        })?;
        json5::from_str(&contents).map_err(|err| ConfigError::Parse {
            path: path.to_string(),
            source: err,
        })
    }
}

/// Failures loading the daemon configuration.
#[derive(Debug)]
pub(crate) enum ConfigError {
    Read {
        path: String,
        source: std::io::Error,
    },
    Parse {
        path: String,
        source: json5::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "unable to read config file {path}: {source}")
            }
            ConfigError::Parse { path, source } => {
                write!(f, "unable to parse config file {path}: {source}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BrokerClientMode, Config, KeyPolicyMode};

    #[test]
    fn defaults_match_the_documented_values() {
        let config = Config::default();

        assert_eq!(config.listener.udp_port, 8000);
        assert_eq!(config.listener.topic, "sensors");
        assert_eq!(config.listener.key_policy, KeyPolicyMode::SenderIp);
        assert_eq!(config.broker.address, "broker:9092");
        assert_eq!(config.broker.client, BrokerClientMode::Loopback);
        assert_eq!(config.probe.max_attempts, 10);
        assert_eq!(config.probe.backoff_secs, 2);
        assert_eq!(config.probe.attempt_timeout_secs, 10);
    }

    #[test]
    fn partial_json5_overrides_keep_the_remaining_defaults() {
        let config: Config = json5::from_str(
            r#"{
                listener: { udp_port: 9123, key_policy: "device_id" },
                broker: { address: "kafka-0:9092" },
            }"#,
        )
        .expect("partial config should parse");

        assert_eq!(config.listener.udp_port, 9123);
        assert_eq!(config.listener.topic, "sensors");
        assert_eq!(config.listener.key_policy, KeyPolicyMode::DeviceId);
        assert_eq!(config.broker.address, "kafka-0:9092");
        assert_eq!(config.probe.max_attempts, 10);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<Config, _> = json5::from_str(r#"{ listner: {} }"#);

        assert!(parsed.is_err());
    }
}
