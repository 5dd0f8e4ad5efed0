// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every check runs and all problems are reported together.

use crate::{ConfigError, ConfigResult, DepthbarConfig};
use std::collections::HashMap;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
    AddressConflict { address: String },
    DuplicateGeometry { first: usize, second: usize, payload_len: usize },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
            Self::AddressConflict { address } => {
                write!(
                    f,
                    "Address conflict: ingress and egress both use {}",
                    address
                )
            }
            Self::DuplicateGeometry {
                first,
                second,
                payload_len,
            } => {
                write!(
                    f,
                    "geometries[{}] and geometries[{}] share payload length {}",
                    first, second, payload_len
                )
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &DepthbarConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_endpoints(config, &mut errors);
    validate_worker(config, &mut errors);
    validate_geometries(config, &mut errors);
    validate_api(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_endpoints(config: &DepthbarConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.ingress.address.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "ingress.address".to_string(),
        });
    }
    if config.egress.address.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "egress.address".to_string(),
        });
    }
    if !config.ingress.address.is_empty() && config.ingress.address == config.egress.address {
        errors.push(ConfigValidationError::AddressConflict {
            address: config.ingress.address.clone(),
        });
    }
}

fn validate_worker(config: &DepthbarConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.worker.rate_interval_ms == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "worker.rate_interval_ms".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if config.worker.measurement_interval_ms == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "worker.measurement_interval_ms".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if config.worker.depth_max == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "worker.depth_max".to_string(),
            reason: "must be positive".to_string(),
        });
    }
}

fn validate_geometries(config: &DepthbarConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.geometries.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "geometries".to_string(),
        });
    }

    let mut seen: HashMap<usize, usize> = HashMap::new();
    for (index, geometry) in config.geometries.iter().enumerate() {
        if geometry.width == 0 || geometry.height == 0 || geometry.depth_levels == 0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("geometries[{}]", index),
                reason: "width, height and depth_levels must be positive".to_string(),
            });
            continue;
        }
        let payload_len = geometry.payload_len();
        if let Some(&first) = seen.get(&payload_len) {
            errors.push(ConfigValidationError::DuplicateGeometry {
                first,
                second: index,
                payload_len,
            });
        } else {
            seen.insert(payload_len, index);
        }
    }
}

fn validate_api(config: &DepthbarConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.api.host.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "api.host".to_string(),
        });
    }
    if config.api.port == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "api.port".to_string(),
            reason: "must be non-zero".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeometryConfig;

    fn validation_message(config: &DepthbarConfig) -> String {
        match validate_config(config) {
            Err(ConfigError::ValidationError(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let result = validate_config(&DepthbarConfig::default());
        if let Err(e) = &result {
            eprintln!("Validation error: {}", e);
        }
        assert!(result.is_ok());
    }

    #[test]
    fn test_same_ingress_and_egress() {
        let mut config = DepthbarConfig::default();
        config.egress.address = config.ingress.address.clone();
        let msg = validation_message(&config);
        assert!(msg.contains("Address conflict"));
        assert!(msg.contains("5501"));
    }

    #[test]
    fn test_zero_intervals() {
        let mut config = DepthbarConfig::default();
        config.worker.rate_interval_ms = 0;
        config.worker.measurement_interval_ms = 0;
        let msg = validation_message(&config);
        assert!(msg.contains("worker.rate_interval_ms"));
        assert!(msg.contains("worker.measurement_interval_ms"));
    }

    #[test]
    fn test_duplicate_geometry_payload() {
        let mut config = DepthbarConfig::default();
        config.geometries.push(GeometryConfig {
            width: 50,
            height: 15,
            depth_levels: 10,
        });
        let msg = validation_message(&config);
        assert!(msg.contains("geometries[0] and geometries[2]"));
        assert!(msg.contains("3000"));
    }

    #[test]
    fn test_zero_geometry_dimension() {
        let mut config = DepthbarConfig::default();
        config.geometries[1].depth_levels = 0;
        let msg = validation_message(&config);
        assert!(msg.contains("geometries[1]"));
    }

    #[test]
    fn test_all_problems_are_reported() {
        let mut config = DepthbarConfig::default();
        config.ingress.address.clear();
        config.worker.depth_max = 0;
        config.api.port = 0;
        let msg = validation_message(&config);
        assert!(msg.contains("ingress.address"));
        assert!(msg.contains("worker.depth_max"));
        assert!(msg.contains("api.port"));
    }
}
