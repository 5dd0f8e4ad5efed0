// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Frame worker loop
//!
//! One dedicated thread owns the ingress subscriber, the egress publisher and
//! the voxel buffers. Each loop iteration services at most one input, stop and
//! enable signals and the measurement tick first, otherwise one frame cycle:
//!
//! 1. take the next queued message (nothing queued ends the cycle)
//! 2. drop it when disabled
//! 3. resolve the geometry from the payload length, warn when unknown
//! 4. drop it when the rate gate has not elapsed
//! 5. render depth bars, publish, record the duration, clear the warning
//!
//! Stop and enable are rendezvous hand-offs. A stop is observed between cycles,
//! never in the middle of a transform.

use crate::buffers::{FrameBuffers, LatestFrame, PublishedFrame};
use crate::error::{WorkerError, WorkerResult};
use crate::status::{WorkerStatus, WorkerStatusSnapshot};
use crate::timer::RateTimer;
use crate::transform::render_depth_bars;
use crossbeam::channel::{self, select, Receiver, Sender};
use depthbar_config::{GeometryConfig, WorkerConfig};
use depthbar_structures::{
    FrameGeometryRegistry, GeometrySpec, ParallelFor, RgbdFrame, VoxelResult,
};
use depthbar_transports::{
    Publisher, Subscriber, TopicMessage, TransportError, TransportResult,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

const THREAD_NAME: &str = "depthbar-frame-worker";

/// Build the geometry table from the `[[geometries]]` and `[worker]` sections.
pub fn registry_from_config(
    geometries: &[GeometryConfig],
    worker: &WorkerConfig,
) -> VoxelResult<FrameGeometryRegistry> {
    let specs: Vec<GeometrySpec> = geometries
        .iter()
        .map(|g| GeometrySpec::new(g.width, g.height, g.depth_levels))
        .collect();
    FrameGeometryRegistry::new(&specs, worker.depth_max)
}

/// An always-ready measurement tick would starve the frame cycle in `select!`
fn check_intervals(config: &WorkerConfig) -> WorkerResult<()> {
    if config.measurement_interval_ms == 0 {
        return Err(WorkerError::InvalidConfig(
            "measurement_interval_ms must be positive".to_string(),
        ));
    }
    if config.rate_interval_ms == 0 {
        return Err(WorkerError::InvalidConfig(
            "rate_interval_ms must be positive".to_string(),
        ));
    }
    Ok(())
}

/// A configured, not yet running, frame worker.
///
/// Generic over the transports so production runs on ZMQ while tests use the
/// in-process pair.
pub struct FrameWorker<S, P> {
    subscriber: S,
    publisher: P,
    registry: Arc<FrameGeometryRegistry>,
    config: WorkerConfig,
    parallel: ParallelFor,
}

impl<S, P> FrameWorker<S, P>
where
    S: Subscriber + 'static,
    P: Publisher + 'static,
{
    pub fn new(
        subscriber: S,
        publisher: P,
        registry: Arc<FrameGeometryRegistry>,
        config: WorkerConfig,
        parallel: ParallelFor,
    ) -> Self {
        Self {
            subscriber,
            publisher,
            registry,
            config,
            parallel,
        }
    }

    /// Open both transports and spawn the worker thread.
    ///
    /// Zero intervals are rejected before any transport is touched. Transport
    /// failures are returned as is; there is no retry.
    pub fn start(mut self) -> WorkerResult<WorkerHandle> {
        check_intervals(&self.config)?;

        if !self.subscriber.is_running() {
            self.subscriber.start()?;
        }
        self.subscriber.subscribe(b"")?;
        if !self.publisher.is_running() {
            self.publisher.start()?;
        }

        let (stop_tx, stop_rx) = channel::bounded(0);
        let (enable_tx, enable_rx) = channel::bounded(0);
        let (enable_ack_tx, enable_ack_rx) = channel::bounded(0);
        let control = ControlInputs {
            stop: stop_rx,
            enable: enable_rx,
            enable_ack: enable_ack_tx,
            measurement: channel::tick(Duration::from_millis(
                self.config.measurement_interval_ms,
            )),
        };

        let status = Arc::new(WorkerStatus::new(self.config.start_enabled));
        status.set_running(true);
        let latest = LatestFrame::default();

        let worker_loop = WorkerLoop {
            subscriber: self.subscriber,
            publisher: self.publisher,
            registry: self.registry,
            rate: RateTimer::new(Duration::from_millis(self.config.rate_interval_ms)),
            poll_timeout_ms: self.config.poll_timeout_ms,
            enabled: self.config.start_enabled,
            buffers: FrameBuffers::new(latest.clone(), self.parallel),
            status: Arc::clone(&status),
        };

        let thread = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || worker_loop.run(control))
            .map_err(|e| {
                status.set_running(false);
                WorkerError::Spawn(e.to_string())
            })?;

        info!(
            "[FRAME-WORKER] Started (enabled: {}, rate interval: {}ms)",
            self.config.start_enabled, self.config.rate_interval_ms
        );

        Ok(WorkerHandle {
            stop_tx,
            enable_tx,
            enable_ack_rx,
            enable_lock: Mutex::new(()),
            thread: Mutex::new(Some(thread)),
            status,
            latest,
        })
    }
}

/// Control side of a running [`FrameWorker`]. Dropping it stops the worker.
pub struct WorkerHandle {
    stop_tx: Sender<()>,
    enable_tx: Sender<bool>,
    enable_ack_rx: Receiver<()>,
    enable_lock: Mutex<()>,
    thread: Mutex<Option<JoinHandle<()>>>,
    status: Arc<WorkerStatus>,
    latest: LatestFrame,
}

impl WorkerHandle {
    /// Hand `enabled` to the worker. Returns once the worker has applied it,
    /// which may wait for an in-flight cycle to finish.
    pub fn enable(&self, enabled: bool) -> WorkerResult<()> {
        let _serialized = self.enable_lock.lock();
        self.enable_tx
            .send(enabled)
            .map_err(|_| WorkerError::Stopped)?;
        self.enable_ack_rx
            .recv()
            .map_err(|_| WorkerError::Stopped)?;
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.status.is_enabled()
    }

    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    /// Stop the worker and wait for its thread to exit.
    ///
    /// No frame is processed after this returns. Calling it again is a no-op.
    pub fn stop(&self) {
        let Some(thread) = self.thread.lock().take() else {
            return;
        };

        // Fails only when the thread is already gone
        let _ = self.stop_tx.send(());

        if thread.join().is_err() {
            error!("[FRAME-WORKER] Worker thread panicked");
            self.status.set_running(false);
        }
    }

    /// The most recently published voxel buffer
    pub fn latest_frame(&self) -> Option<Arc<PublishedFrame>> {
        self.latest.get()
    }

    pub fn status(&self) -> WorkerStatusSnapshot {
        self.status.snapshot()
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Receivers serviced ahead of the frame cycle
struct ControlInputs {
    stop: Receiver<()>,
    enable: Receiver<bool>,
    enable_ack: Sender<()>,
    measurement: Receiver<Instant>,
}

struct WorkerLoop<S, P> {
    subscriber: S,
    publisher: P,
    registry: Arc<FrameGeometryRegistry>,
    rate: RateTimer,
    poll_timeout_ms: u64,
    enabled: bool,
    buffers: FrameBuffers,
    status: Arc<WorkerStatus>,
}

impl<S, P> WorkerLoop<S, P>
where
    S: Subscriber,
    P: Publisher,
{
    fn run(mut self, control: ControlInputs) {
        loop {
            select! {
                recv(control.stop) -> _ => break,
                recv(control.enable) -> message => match message {
                    Ok(enabled) => {
                        self.set_enabled(enabled);
                        // The handle waits for this unless it gave up on a closed channel
                        let _ = control.enable_ack.send(());
                    }
                    Err(_) => break,
                },
                recv(control.measurement) -> _ => self.report(),
                default => self.cycle(),
            }
        }

        self.shutdown();
    }

    fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!("[FRAME-WORKER] Enabled: {}", enabled);
        }
        self.enabled = enabled;
        self.status.set_enabled(enabled);
    }

    fn report(&self) {
        match self.status.warning_message() {
            Some(warning) => warn!("[FRAME-WORKER] {}", warning),
            None => info!(
                "[FRAME-WORKER] Send frame... last frame duration: {:?}",
                self.status.last_duration().unwrap_or_default()
            ),
        }
    }

    fn receive(&self) -> TransportResult<Option<TopicMessage>> {
        if self.poll_timeout_ms == 0 {
            return self.subscriber.try_receive();
        }

        match self.subscriber.receive_timeout(self.poll_timeout_ms) {
            Ok(message) => Ok(Some(message)),
            Err(TransportError::Timeout) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn cycle(&mut self) {
        let started = Instant::now();

        let payload = match self.receive() {
            Ok(Some(message)) => message.payload,
            Ok(None) => return,
            Err(e) => {
                self.status.set_warning(format!("Receive failed: {}", e));
                return;
            }
        };

        if !self.enabled {
            trace!("[FRAME-WORKER] Disabled, dropped {} byte frame", payload.len());
            return;
        }

        let Some(geometry) = self.registry.resolve(payload.len()) else {
            self.status
                .set_warning(format!("Invalid Data Length: {}", payload.len()));
            return;
        };

        if !self.rate.is_past() {
            trace!("[FRAME-WORKER] Rate limited, dropped frame");
            return;
        }

        let frame = match RgbdFrame::new(&payload, &geometry) {
            Ok(frame) => frame,
            Err(e) => {
                self.status.set_warning(e.to_string());
                return;
            }
        };

        let mut voxels = self.buffers.checkout(&geometry);
        if let Err(e) = render_depth_bars(&frame, geometry.thresholds(), &mut voxels) {
            self.status.set_warning(e.to_string());
            self.buffers.checkin(&geometry, voxels);
            return;
        }

        match self.publisher.publish_simple(voxels.as_bytes()) {
            Ok(()) => {
                self.status.record_publish(started.elapsed());
                let sequence = self.buffers.commit(&geometry, voxels);
                trace!("[FRAME-WORKER] Published frame {}", sequence);
            }
            Err(e) => {
                self.status.set_warning(format!("Publish failed: {}", e));
                self.buffers.checkin(&geometry, voxels);
            }
        }
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.subscriber.stop() {
            warn!("[FRAME-WORKER] Failed to stop {}: {}", self.subscriber.transport_type(), e);
        }
        if let Err(e) = self.publisher.stop() {
            warn!("[FRAME-WORKER] Failed to stop {}: {}", self.publisher.transport_type(), e);
        }
        self.status.set_running(false);
        debug!("[FRAME-WORKER] Transports closed");
        info!("[FRAME-WORKER] Stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_from_config() {
        let registry =
            registry_from_config(&GeometryConfig::defaults(), &WorkerConfig::default()).unwrap();
        assert_eq!(registry.supported_payload_lengths(), vec![3000, 12000]);
        assert_eq!(registry.depth_max(), 128);
    }

    #[test]
    fn test_registry_rejects_duplicate_lengths() {
        let geometries = [
            GeometryConfig {
                width: 15,
                height: 50,
                depth_levels: 15,
            },
            GeometryConfig {
                width: 50,
                height: 15,
                depth_levels: 8,
            },
        ];
        assert!(registry_from_config(&geometries, &WorkerConfig::default()).is_err());
    }
}
