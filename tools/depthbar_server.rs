// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! depthbar server: RGBD frames in, depth-bar voxel buffers out, HTTP control.

use anyhow::{Context, Result};
use clap::Parser;
use depthbar::config::{
    apply_cli_overrides, apply_environment_overrides, load_config, validate_config, ConfigError,
    DepthbarConfig, LogOutputFormat, LoggingConfig,
};
use depthbar::observability::{
    debug_flags_help, init_logging, CrateDebugFlags, LogFormat, LoggingOptions,
};
use depthbar::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// RGBD to volumetric LED voxel bridge
#[derive(Parser, Debug)]
#[command(name = "depthbar-server", version, long_about = None, after_help = debug_flags_help())]
struct Args {
    /// Host and port of the RGBD frame publisher (e.g. 127.0.0.1:5501)
    #[arg(short = 'r', long = "rgbd")]
    rgbd: Option<String>,

    /// Host and port of the LED adapter (e.g. 127.0.0.1:5520)
    #[arg(short = 'a', long = "adapter")]
    adapter: Option<String>,

    /// Path to depthbar_configuration.toml (searched for when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// HTTP control port
    #[arg(long)]
    http_port: Option<u16>,
}

impl Args {
    fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(rgbd) = &self.rgbd {
            overrides.insert("ingress_address".to_string(), format!("tcp://{}", rgbd));
        }
        if let Some(adapter) = &self.adapter {
            overrides.insert("egress_address".to_string(), format!("tcp://{}", adapter));
        }
        if let Some(port) = self.http_port {
            overrides.insert("api_port".to_string(), port.to_string());
        }
        overrides
    }
}

/// Load, override and validate. `None` source means built-in defaults.
fn load_configuration(args: &Args) -> Result<(DepthbarConfig, Option<PathBuf>)> {
    let overrides = args.overrides();

    let loaded = match &args.config {
        Some(path) => load_config(Some(path.as_path()), Some(&overrides))
            .map(|config| (config, Some(path.clone())))
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => match load_config(None, Some(&overrides)) {
            Ok(config) => {
                let source = depthbar::config::find_config_file().ok();
                (config, source)
            }
            Err(ConfigError::FileNotFound(_)) => {
                let mut config = DepthbarConfig::default();
                apply_environment_overrides(&mut config);
                apply_cli_overrides(&mut config, &overrides);
                (config, None)
            }
            Err(e) => return Err(e).context("Failed to load configuration"),
        },
    };

    validate_config(&loaded.0).context("Invalid configuration")?;
    Ok(loaded)
}

fn logging_options(logging: &LoggingConfig) -> LoggingOptions {
    LoggingOptions {
        level: logging.level.clone(),
        format: match logging.format {
            LogOutputFormat::Text => LogFormat::Text,
            LogOutputFormat::Json => LogFormat::Json,
        },
        log_dir: (cfg!(feature = "file-logging") && !logging.log_dir.is_empty())
            .then(|| PathBuf::from(&logging.log_dir)),
        retention_days: logging.retention_days,
        ..LoggingOptions::default()
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received..."),
        Err(e) => {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // `--debug-<crate>` flags are not clap arguments
    let (debug_args, cli_args): (Vec<String>, Vec<String>) =
        std::env::args().partition(|arg| arg.starts_with("--debug-"));
    let args = Args::parse_from(cli_args);
    let mut debug_flags = CrateDebugFlags::from_args(debug_args);
    if let Ok(value) = std::env::var("DEPTHBAR_DEBUG") {
        debug_flags.merge_env_value(&value);
    }

    let (config, source) = load_configuration(&args)?;
    let _log_guard = init_logging(&debug_flags, &logging_options(&config.logging))?;

    match &source {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }
    info!(
        "Ingress {} ({:?}), egress {} ({:?})",
        config.ingress.address, config.ingress.link, config.egress.address, config.egress.link
    );

    let parallel = ParallelFor::with_threads(config.worker.max_threads)
        .context("Failed to build the transform thread pool")?;
    let registry = Arc::new(
        registry_from_config(&config.geometries, &config.worker)
            .context("Invalid geometry table")?,
    );

    let context = Arc::new(zmq::Context::new());
    let subscriber = ZmqSub::new(Arc::clone(&context), TransportConfig::from(&config.ingress))?;
    let publisher = ZmqPub::new(context, TransportConfig::from(&config.egress))?;

    info!("Starting depthbar frame worker..");
    let worker = FrameWorker::new(
        subscriber,
        publisher,
        registry,
        config.worker.clone(),
        parallel,
    );
    let handle = Arc::new(worker.start().context("Failed to start the frame worker")?);

    let address = format!("{}:{}", config.api.host, config.api.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind HTTP control surface on {}", address))?;

    let control: Arc<dyn WorkerControl> = handle.clone();
    let served = depthbar::api::serve(listener, ApiState::new(control), shutdown_signal()).await;

    let stopper = Arc::clone(&handle);
    tokio::task::spawn_blocking(move || stopper.stop())
        .await
        .context("Frame worker shutdown task failed")?;

    served.context("HTTP control surface failed")?;
    info!("depthbar shutdown complete");
    Ok(())
}
