// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

// CORS for browser-based display controllers

use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Any origin may call the control endpoints, but only with the methods and
/// headers they actually accept. Controllers run from arbitrary hosts on the
/// local network and never send credentials.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(false)
}
