// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # depthbar-worker
//!
//! Turns RGBD camera frames into RGB565 voxel buffers for a volumetric LED
//! display. Each pixel's depth becomes a bar of lit voxels in its column.
//!
//! ```no_run
//! use depthbar_config::WorkerConfig;
//! use depthbar_structures::{FrameGeometryRegistry, ParallelFor};
//! use depthbar_transports::InprocBroker;
//! use depthbar_worker::FrameWorker;
//! use std::sync::Arc;
//!
//! let ingress = InprocBroker::new();
//! let egress = InprocBroker::new();
//! let worker = FrameWorker::new(
//!     ingress.subscriber(4),
//!     egress.publisher(),
//!     Arc::new(FrameGeometryRegistry::with_default_geometries()?),
//!     WorkerConfig::default(),
//!     ParallelFor::global(),
//! );
//!
//! let handle = worker.start()?;
//! handle.enable(false)?;
//! handle.stop();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod buffers;
mod error;
mod status;
pub mod timer;
pub mod transform;
mod worker;

pub use buffers::{LatestFrame, PublishedFrame};
pub use error::{WorkerError, WorkerResult};
pub use status::{WorkerStatus, WorkerStatusSnapshot};
pub use timer::RateTimer;
pub use transform::render_depth_bars;
pub use worker::{registry_from_config, FrameWorker, WorkerHandle};
