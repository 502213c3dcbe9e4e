use std::time::Duration;

use peary_frame::DEFAULT_BUFFER_SIZE;
use peary_session::{SessionConfig, PROTOCOL_VERSION};
use peary_transport::DEFAULT_PORT;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Connection settings for a [`Client`](crate::Client).
///
/// Every field has a default, so partial JSON documents load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Connect, read and write timeout in milliseconds.
    pub timeout_ms: u64,
    /// Size of a single receive call.
    pub buffer_size: usize,
    /// Verify the daemon's protocol version after connecting.
    pub check_version: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            timeout_ms: 1000,
            buffer_size: DEFAULT_BUFFER_SIZE,
            check_version: true,
        }
    }
}

impl ClientConfig {
    /// Settings for `host:port`, defaults otherwise.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Load settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The session settings these client settings imply.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            timeout: self.timeout(),
            check_version: self.check_version,
            protocol_version: PROTOCOL_VERSION.to_string(),
            buffer_size: self.buffer_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn defaults_match_daemon_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 12345);
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert_eq!(config.buffer_size, 4096);
        assert!(config.check_version);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ClientConfig::from_json(r#"{"host": "daq-01", "timeout_ms": 250}"#)
            .expect("partial config should load");
        assert_eq!(config.host, "daq-01");
        assert_eq!(config.port, 12345);
        assert_eq!(config.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = ClientConfig::from_json(r#"{"port": "not-a-port"}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn session_config_carries_settings() {
        let mut config = ClientConfig::new("10.0.0.2", 4000);
        config.buffer_size = 64;
        config.check_version = false;

        let session = config.session_config();
        assert_eq!(session.buffer_size, 64);
        assert!(!session.check_version);
        assert_eq!(session.protocol_version, "1");
        assert_eq!(session.timeout, Duration::from_secs(1));
    }

    #[test]
    fn serializes_back_to_json() {
        let config = ClientConfig::new("daq-02", 12346);
        let json = serde_json::to_string(&config).expect("config should serialize");
        assert_eq!(ClientConfig::from_json(&json).unwrap(), config);
    }
}
