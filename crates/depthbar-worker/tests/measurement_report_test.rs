// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Periodic health report, captured from the worker thread's log output
//!
//! Installs a global subscriber, so it lives in its own test binary.

use depthbar_config::WorkerConfig;
use depthbar_structures::{FrameGeometryRegistry, ParallelFor};
use depthbar_transports::prelude::*;
use depthbar_worker::FrameWorker;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn wait_for_line(log: &CapturedLog, skip: usize, matches: impl Fn(&str) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if log.text()[skip..].lines().any(&matches) {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn test_report_shows_warning_then_duration() {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::set_global_default(subscriber).unwrap();

    let ingress = InprocBroker::new();
    let egress = InprocBroker::new();
    let mut camera = ingress.publisher();
    camera.start().unwrap();
    let mut display = egress.subscriber(0);
    display.start().unwrap();
    display.subscribe(b"").unwrap();

    let handle = FrameWorker::new(
        ingress.subscriber(16),
        egress.publisher(),
        Arc::new(FrameGeometryRegistry::with_default_geometries().unwrap()),
        WorkerConfig {
            rate_interval_ms: 1,
            measurement_interval_ms: 50,
            ..WorkerConfig::default()
        },
        ParallelFor::global(),
    )
    .start()
    .unwrap();

    // A pending warning is reported at warn level
    camera.publish_simple(&[0u8; 7]).unwrap();
    assert!(wait_for_line(&log, 0, |line| {
        line.contains("WARN") && line.contains("[FRAME-WORKER] Invalid Data Length: 7")
    }));

    // A successful publish clears it, later reports carry the duration at info level
    thread::sleep(Duration::from_millis(5));
    camera.publish_simple(&[0x10, 0x20, 0x30, 64].repeat(15 * 50)).unwrap();
    assert!(display.receive_timeout(2000).is_ok());
    let deadline = Instant::now() + Duration::from_secs(1);
    while handle.status().warning_message.is_some() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(handle.status().warning_message.is_none());
    let published_at = log.text().len();
    assert!(wait_for_line(&log, published_at, |line| {
        line.contains("INFO") && line.contains("[FRAME-WORKER] Send frame... last frame duration")
    }));
    assert!(!log.text()[published_at..]
        .lines()
        .any(|line| line.contains("Invalid Data Length")));

    handle.stop();
}
