// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `depthbar_configuration.toml`.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DepthbarConfig {
    /// RGBD frames in
    pub ingress: EndpointConfig,
    /// Voxel buffers out
    pub egress: EndpointConfig,
    pub worker: WorkerConfig,
    pub geometries: Vec<GeometryConfig>,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

impl Default for DepthbarConfig {
    fn default() -> Self {
        Self {
            ingress: EndpointConfig::ingress_default(),
            egress: EndpointConfig::egress_default(),
            worker: WorkerConfig::default(),
            geometries: GeometryConfig::defaults(),
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Whether a socket binds its address or connects to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    Bind,
    #[default]
    Connect,
}

/// One message channel endpoint
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// ZMQ endpoint, e.g. `tcp://127.0.0.1:5501`
    pub address: String,
    pub link: LinkMode,
    pub send_hwm: i32,
    pub recv_hwm: i32,
    /// Linger on close in milliseconds (0 = drop pending messages)
    pub linger_ms: u64,
    /// Payloads above this size are rejected by the transport (0 = unlimited)
    pub max_message_size: usize,
}

impl EndpointConfig {
    pub fn ingress_default() -> Self {
        Self {
            address: "tcp://127.0.0.1:5501".to_string(),
            ..Self::default()
        }
    }

    pub fn egress_default() -> Self {
        Self {
            address: "tcp://127.0.0.1:5520".to_string(),
            ..Self::default()
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            link: LinkMode::Connect,
            send_hwm: 1000,
            recv_hwm: 1000,
            linger_ms: 0,
            max_message_size: 0,
        }
    }
}

/// Frame worker configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Whether frames are transformed right after startup
    pub start_enabled: bool,
    /// Minimum spacing between published frames
    pub rate_interval_ms: u64,
    /// Health report period
    pub measurement_interval_ms: u64,
    /// 0 = non-blocking poll of the ingress socket, >0 = bounded wait per cycle
    pub poll_timeout_ms: u64,
    /// Upper bound of the depth threshold table
    pub depth_max: u32,
    /// Parallel transform threads (0 = shared rayon pool)
    pub max_threads: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            start_enabled: true,
            rate_interval_ms: 50,
            measurement_interval_ms: 2000,
            poll_timeout_ms: 0,
            depth_max: 128,
            max_threads: 0,
        }
    }
}

/// A supported input resolution and the depth levels it renders to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeometryConfig {
    pub width: u32,
    pub height: u32,
    pub depth_levels: u32,
}

impl GeometryConfig {
    pub fn defaults() -> Vec<GeometryConfig> {
        vec![
            GeometryConfig {
                width: 15,
                height: 50,
                depth_levels: 15,
            },
            GeometryConfig {
                width: 30,
                height: 100,
                depth_levels: 30,
            },
        ]
    }

    /// RGBD payload length (4 bytes per pixel)
    pub fn payload_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// HTTP control surface configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5002,
        }
    }
}

/// Console log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutputFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for every depthbar crate (`trace`..`error`)
    pub level: String,
    pub format: LogOutputFormat,
    /// Directory for rolling log files (file-logging builds only)
    pub log_dir: String,
    /// Days of file logs to keep
    pub retention_days: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogOutputFormat::Text,
            log_dir: "./logs".to_string(),
            retention_days: 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DepthbarConfig::default();
        assert_eq!(config.ingress.address, "tcp://127.0.0.1:5501");
        assert_eq!(config.egress.address, "tcp://127.0.0.1:5520");
        assert_eq!(config.ingress.link, LinkMode::Connect);
        assert!(config.worker.start_enabled);
        assert_eq!(config.worker.rate_interval_ms, 50);
        assert_eq!(config.worker.measurement_interval_ms, 2000);
        assert_eq!(config.api.port, 5002);
        assert_eq!(
            config
                .geometries
                .iter()
                .map(GeometryConfig::payload_len)
                .collect::<Vec<_>>(),
            vec![3000, 12000]
        );
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: DepthbarConfig = toml::from_str(
            r#"
            [worker]
            rate_interval_ms = 100

            [egress]
            link = "bind"
            "#,
        )
        .unwrap();
        assert_eq!(config.worker.rate_interval_ms, 100);
        assert_eq!(config.worker.depth_max, 128);
        assert_eq!(config.egress.link, LinkMode::Bind);
        // a partial [egress] table falls back to the field defaults, not the egress preset
        assert_eq!(config.egress.address, "");
        assert_eq!(config.geometries.len(), 2);
    }

    #[test]
    fn test_geometries_replace_defaults() {
        let config: DepthbarConfig = toml::from_str(
            r#"
            [[geometries]]
            width = 16
            height = 32
            depth_levels = 8
            "#,
        )
        .unwrap();
        assert_eq!(
            config.geometries,
            vec![GeometryConfig {
                width: 16,
                height: 32,
                depth_levels: 8
            }]
        );
    }

    #[test]
    fn test_log_format_serializes_lowercase() {
        let json = serde_json::to_string(&LogOutputFormat::Json).unwrap();
        assert_eq!(json, "\"json\"");
    }
}
