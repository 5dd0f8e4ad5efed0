// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, DepthbarConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "depthbar_configuration.toml";

/// Find the depthbar configuration file
///
/// Search order:
/// 1. `DEPTHBAR_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("DEPTHBAR_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by DEPTHBAR_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|path| path.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "depthbar configuration file '{}' not found in any of these locations:\n{}\n\nSet DEPTHBAR_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Validation is a separate step, see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<DepthbarConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: DepthbarConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_bool(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `DEPTHBAR_INGRESS_ADDRESS` -> `ingress.address`
/// - `DEPTHBAR_EGRESS_ADDRESS` -> `egress.address`
/// - `DEPTHBAR_API_HOST` -> `api.host`
/// - `DEPTHBAR_API_PORT` -> `api.port`
/// - `DEPTHBAR_RATE_INTERVAL_MS` -> `worker.rate_interval_ms`
/// - `DEPTHBAR_MAX_THREADS` -> `worker.max_threads`
/// - `DEPTHBAR_START_ENABLED` -> `worker.start_enabled`
/// - `DEPTHBAR_LOG_LEVEL` -> `logging.level`
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut DepthbarConfig) {
    if let Ok(value) = env::var("DEPTHBAR_INGRESS_ADDRESS") {
        config.ingress.address = value;
    }
    if let Ok(value) = env::var("DEPTHBAR_EGRESS_ADDRESS") {
        config.egress.address = value;
    }

    if let Ok(value) = env::var("DEPTHBAR_API_HOST") {
        config.api.host = value;
    }
    if let Ok(value) = env::var("DEPTHBAR_API_PORT") {
        if let Ok(port) = value.parse::<u16>() {
            config.api.port = port;
        }
    }

    if let Ok(value) = env::var("DEPTHBAR_RATE_INTERVAL_MS") {
        if let Ok(interval) = value.parse::<u64>() {
            config.worker.rate_interval_ms = interval;
        }
    }
    if let Ok(value) = env::var("DEPTHBAR_MAX_THREADS") {
        if let Ok(threads) = value.parse::<usize>() {
            config.worker.max_threads = threads;
        }
    }
    if let Ok(value) = env::var("DEPTHBAR_START_ENABLED") {
        config.worker.start_enabled = parse_bool(&value);
    }

    if let Ok(value) = env::var("DEPTHBAR_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"api_port": "9000"}`)
pub fn apply_cli_overrides(config: &mut DepthbarConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("ingress_address") {
        config.ingress.address = value.clone();
    }
    if let Some(value) = cli_args.get("egress_address") {
        config.egress.address = value.clone();
    }

    if let Some(value) = cli_args.get("api_host") {
        config.api.host = value.clone();
    }
    if let Some(value) = cli_args.get("api_port") {
        if let Ok(port) = value.parse::<u16>() {
            config.api.port = port;
        }
    }

    if let Some(value) = cli_args.get("start_enabled") {
        config.worker.start_enabled = parse_bool(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}
