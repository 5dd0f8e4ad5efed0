// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

// depthbar HTTP control surface
//
// Three endpoints, kept compatible with existing display controllers:
// POST /api/config, GET /api/status and GET /api/hello.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod common;
pub mod endpoints;
pub mod middleware;
pub mod transports;

// Re-export commonly used types
pub use common::{ApiError, ApiErrorCode, ApiResult, EnableStatus, WorkerControl};
pub use transports::http::server::{create_http_server, serve, ApiState};
