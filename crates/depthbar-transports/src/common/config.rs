// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Common configuration types for transports

use super::error::{TransportError, TransportResult};
use depthbar_config::EndpointConfig;
pub use depthbar_config::LinkMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Generic transport configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Address to bind or connect
    pub address: String,

    /// Whether the socket binds or connects
    pub link: LinkMode,

    /// Timeout for blocking sends (None = infinite)
    pub timeout: Option<Duration>,

    /// High water mark for send buffer (0 = unlimited)
    pub send_hwm: i32,

    /// High water mark for receive buffer (0 = unlimited)
    pub recv_hwm: i32,

    /// Linger time on close (None = drop pending messages)
    pub linger: Option<Duration>,

    /// Maximum message size (None = unlimited)
    pub max_message_size: Option<usize>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            address: "tcp://127.0.0.1:5501".to_string(),
            link: LinkMode::Connect,
            timeout: Some(Duration::from_secs(1)),
            send_hwm: 1000,
            recv_hwm: 1000,
            linger: None,
            max_message_size: None,
        }
    }
}

impl TransportConfig {
    /// Create a new config with the given address
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_link(mut self, link: LinkMode) -> Self {
        self.link = link;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_send_hwm(mut self, hwm: i32) -> Self {
        self.send_hwm = hwm;
        self
    }

    pub fn with_recv_hwm(mut self, hwm: i32) -> Self {
        self.recv_hwm = hwm;
        self
    }

    pub fn with_linger(mut self, linger: Duration) -> Self {
        self.linger = Some(linger);
        self
    }

    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = Some(size);
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> TransportResult<()> {
        if self.address.is_empty() {
            return Err(TransportError::InvalidConfig(
                "Address cannot be empty".to_string(),
            ));
        }
        if self.send_hwm < 0 || self.recv_hwm < 0 {
            return Err(TransportError::InvalidConfig(
                "High water marks cannot be negative".to_string(),
            ));
        }
        if self.max_message_size == Some(0) {
            return Err(TransportError::InvalidConfig(
                "Maximum message size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Reject payloads above `max_message_size`
    pub fn check_size(&self, size: usize) -> TransportResult<()> {
        match self.max_message_size {
            Some(max_size) if size > max_size => {
                Err(TransportError::MessageTooLarge { size, max_size })
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn linger_ms(&self) -> i32 {
        self.linger
            .map(|linger| i32::try_from(linger.as_millis()).unwrap_or(i32::MAX))
            .unwrap_or(0)
    }
}

impl From<&EndpointConfig> for TransportConfig {
    fn from(endpoint: &EndpointConfig) -> Self {
        Self {
            address: endpoint.address.clone(),
            link: endpoint.link,
            send_hwm: endpoint.send_hwm,
            recv_hwm: endpoint.recv_hwm,
            linger: (endpoint.linger_ms > 0).then(|| Duration::from_millis(endpoint.linger_ms)),
            max_message_size: (endpoint.max_message_size > 0).then_some(endpoint.max_message_size),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_endpoint_config() {
        let endpoint = EndpointConfig {
            address: "tcp://127.0.0.1:6000".to_string(),
            link: LinkMode::Bind,
            send_hwm: 10,
            recv_hwm: 20,
            linger_ms: 0,
            max_message_size: 4096,
        };
        let config = TransportConfig::from(&endpoint);
        assert_eq!(config.address, "tcp://127.0.0.1:6000");
        assert_eq!(config.link, LinkMode::Bind);
        assert_eq!(config.send_hwm, 10);
        assert_eq!(config.recv_hwm, 20);
        assert_eq!(config.linger, None);
        assert_eq!(config.max_message_size, Some(4096));
    }

    #[test]
    fn test_validate() {
        assert!(TransportConfig::new("tcp://127.0.0.1:1").validate().is_ok());
        assert!(matches!(
            TransportConfig::new("").validate(),
            Err(TransportError::InvalidConfig(_))
        ));
        assert!(TransportConfig::new("x")
            .with_max_message_size(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_check_size() {
        let config = TransportConfig::new("x").with_max_message_size(3000);
        assert!(config.check_size(3000).is_ok());
        assert!(matches!(
            config.check_size(3001),
            Err(TransportError::MessageTooLarge {
                size: 3001,
                max_size: 3000
            })
        ));
    }
}
