// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

// HTTP server implementation (Axum)
//
// Routing, middleware and state for the control surface.

use crate::common::WorkerControl;
use crate::endpoints::{get_status, hello, not_implemented, set_config};
use crate::middleware::create_cors_layer;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across all HTTP handlers
#[derive(Clone)]
pub struct ApiState {
    pub control: Arc<dyn WorkerControl>,
}

impl ApiState {
    pub fn new(control: Arc<dyn WorkerControl>) -> Self {
        Self { control }
    }
}

/// Create the control surface router
pub fn create_http_server(state: ApiState) -> Router {
    Router::new()
        .route("/api/config", post(set_config).fallback(not_implemented))
        .route("/api/status", get(get_status).fallback(not_implemented))
        .route("/api/hello", get(hello).fallback(not_implemented))
        .fallback(|| async {
            tracing::debug!("[API] Unmatched request - 404 Not Found");
            (StatusCode::NOT_FOUND, "404 Not Found")
        })
        .with_state(state)
        .layer(create_cors_layer())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::debug_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::debug!(
                            "[API] Response: status={}, latency={:?}",
                            response.status(),
                            latency
                        );
                    },
                ),
        )
}

/// Serve the router on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: ApiState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(address) = listener.local_addr() {
        info!("[API] HTTP server listening on {}", address);
    }

    axum::serve(listener, create_http_server(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("[API] HTTP server stopped");
    Ok(())
}
