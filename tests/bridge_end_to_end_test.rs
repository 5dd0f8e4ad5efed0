// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Camera frames through the worker to the display, toggled over HTTP

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use depthbar::config::DepthbarConfig;
use depthbar::prelude::*;
use depthbar::structures::RgbdFrame;
use depthbar::worker::render_depth_bars;
use serde_json::Value;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tower::ServiceExt;

const LARGE_FRAME: usize = 30 * 100 * 4;

struct Bridge {
    camera: InprocPub,
    display: InprocSub,
    handle: Arc<WorkerHandle>,
    registry: Arc<FrameGeometryRegistry>,
    _brokers: (InprocBroker, InprocBroker),
}

fn start_bridge() -> Bridge {
    let mut config = DepthbarConfig::default();
    config.worker.rate_interval_ms = 1;

    let registry = Arc::new(registry_from_config(&config.geometries, &config.worker).unwrap());
    let ingress = InprocBroker::new();
    let egress = InprocBroker::new();

    let mut camera = ingress.publisher();
    camera.start().unwrap();
    let mut display = egress.subscriber(0);
    display.start().unwrap();
    display.subscribe(b"").unwrap();

    let worker = FrameWorker::new(
        ingress.subscriber(16),
        egress.publisher(),
        Arc::clone(&registry),
        config.worker.clone(),
        ParallelFor::with_threads(2).unwrap(),
    );

    let handle = Arc::new(worker.start().unwrap());
    // The rate gate starts timing at start, frames inside the first interval are dropped
    thread::sleep(Duration::from_millis(config.worker.rate_interval_ms * 10));

    Bridge {
        camera,
        display,
        handle,
        registry,
        _brokers: (ingress, egress),
    }
}

/// Colour and depth vary with the pixel position
fn gradient_frame() -> Vec<u8> {
    (0..LARGE_FRAME / 4)
        .flat_map(|i| {
            let v = (i % 256) as u8;
            [v, v.wrapping_mul(3), 255 - v, (i % 200) as u8]
        })
        .collect()
}

fn next_output(display: &InprocSub, timeout: Duration) -> Option<Vec<u8>> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Some(message) = display.try_receive().unwrap() {
            return Some(message.payload);
        }
        thread::sleep(Duration::from_millis(5));
    }
    None
}

async fn call(bridge: &Bridge, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let control: Arc<dyn WorkerControl> = bridge.handle.clone();
    let response = create_http_server(ApiState::new(control))
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[test]
fn test_published_buffer_matches_direct_render() {
    let bridge = start_bridge();
    let payload = gradient_frame();

    bridge.camera.publish_simple(&payload).unwrap();
    let output = next_output(&bridge.display, Duration::from_secs(2)).expect("no frame published");
    assert!(next_output(&bridge.display, Duration::from_millis(50)).is_none());

    let geometry = bridge.registry.resolve(payload.len()).unwrap();
    let frame = RgbdFrame::new(&payload, &geometry).unwrap();
    let mut expected = geometry.new_voxel_buffer(ParallelFor::global());
    render_depth_bars(&frame, geometry.thresholds(), &mut expected).unwrap();

    assert_eq!(output.len(), geometry.voxel_byte_len());
    assert_eq!(output, expected.as_bytes());

    let latest = bridge.handle.latest_frame().unwrap();
    assert_eq!(latest.as_bytes(), expected.as_bytes());
    bridge.handle.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_http_disable_stops_output() {
    let bridge = start_bridge();
    let payload = gradient_frame();

    let (status, body) = call(&bridge, Method::GET, "/api/status", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enable"], true);

    let (status, body) = call(&bridge, Method::POST, "/api/config", r#"{"enable": false}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enable"], false);
    assert!(!bridge.handle.is_enabled());

    bridge.camera.publish_simple(&payload).unwrap();
    assert!(next_output(&bridge.display, Duration::from_millis(200)).is_none());

    let (_, body) = call(&bridge, Method::POST, "/api/config", r#"{"enable": true}"#).await;
    assert_eq!(body["enable"], true);

    bridge.camera.publish_simple(&payload).unwrap();
    assert!(next_output(&bridge.display, Duration::from_secs(2)).is_some());

    let handle = Arc::clone(&bridge.handle);
    tokio::task::spawn_blocking(move || handle.stop()).await.unwrap();

    let (status, body) = call(&bridge, Method::POST, "/api/config", r#"{"enable": true}"#).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["detail"].is_string());
}
