// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

// Control endpoints

use crate::common::{ApiError, ApiResult, EnableStatus};
use crate::transports::http::server::ApiState;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use std::sync::Arc;
use tracing::{debug, info};

/// POST /api/config
///
/// Parses the body itself so that any content type is accepted.
pub async fn set_config(State(state): State<ApiState>, body: Bytes) -> ApiResult<Json<EnableStatus>> {
    let request: EnableStatus = serde_json::from_slice(&body).map_err(|e| {
        debug!("[API] Rejected config body: {}", e);
        ApiError::invalid_json()
    })?;

    // The worker may be mid-cycle, keep the wait off the async executor
    let control = Arc::clone(&state.control);
    tokio::task::spawn_blocking(move || control.enable(request.enable))
        .await
        .map_err(|e| ApiError::internal(format!("Enable task failed: {}", e)))??;

    info!("[API] Frame worker enable set to {}", request.enable);
    Ok(Json(EnableStatus {
        enable: state.control.is_enabled(),
    }))
}

/// GET /api/status
pub async fn get_status(State(state): State<ApiState>) -> Json<EnableStatus> {
    Json(EnableStatus {
        enable: state.control.is_enabled(),
    })
}

/// GET /api/hello
pub async fn hello() -> &'static str {
    "Hello"
}

/// Any method a route does not support
pub async fn not_implemented() -> ApiError {
    ApiError::not_implemented()
}
