// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # depthbar-observability
//!
//! Logging setup shared by every depthbar binary, with per-crate debug flags.
//!
//! ## Features
//! - `file-logging`: rolling per-crate log files under a timestamped run folder

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known depthbar crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "depthbar",
    "depthbar-api",
    "depthbar-config",
    "depthbar-structures",
    "depthbar-transports",
    "depthbar-worker",
];

/// Tracing target of a crate name (`depthbar-worker` -> `depthbar_worker`).
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
