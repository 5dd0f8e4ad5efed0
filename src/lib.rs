// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # depthbar
//!
//! Bridges an RGBD camera to a volumetric LED display. Each incoming frame is
//! turned into an RGB565 voxel buffer in which every pixel's depth is drawn as a
//! bar of lit voxels, then published to the display adapter.
//!
//! ## Feature Flags
//!
//! - **`zmq-transport`** (default): ZMQ sockets and the `depthbar-server` binary
//! - **`file-logging`**: rolling per-crate log files next to console output
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   RGBD frame   ┌──────────────────┐  RGB565 voxels  ┌─────────────┐
//! │ RGBD camera  │ ─────────────> │  depthbar-worker │ ──────────────> │ LED adapter │
//! │ (ZMQ PUB)    │    ZMQ SUB     │  rate gate +     │     ZMQ PUB     │ (ZMQ SUB)   │
//! └──────────────┘                │  depth bars      │                 └─────────────┘
//!                                 └──────────────────┘
//!                                          ↑ enable / status
//!                                 ┌──────────────────┐
//!                                 │   depthbar-api   │  HTTP :5002
//!                                 └──────────────────┘
//! ```
//!
//! ## Crates
//!
//! - [`structures`]: voxel containers, RGB565, frame geometry, ParallelFor
//! - [`worker`]: rate gate, depth-bar transform, frame worker
//! - [`transports`]: ZMQ and in-process publish-subscribe
//! - [`config`]: TOML configuration with environment and CLI overrides
//! - [`observability`]: tracing initialisation and per-crate debug flags
//! - [`api`]: HTTP control surface
//!
//! ## License
//!
//! Apache-2.0

pub use depthbar_api as api;
pub use depthbar_config as config;
pub use depthbar_observability as observability;
pub use depthbar_structures as structures;
pub use depthbar_transports as transports;
pub use depthbar_worker as worker;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::api::{create_http_server, ApiState, WorkerControl};
    pub use crate::config::{DepthbarConfig, WorkerConfig};
    pub use crate::structures::{FrameGeometryRegistry, GeometrySpec, ParallelFor, Rgb565};
    pub use crate::transports::{
        InprocBroker, InprocPub, InprocSub, LinkMode, Publisher, Subscriber, Transport,
        TransportConfig,
    };
    pub use crate::worker::{registry_from_config, FrameWorker, WorkerHandle};

    #[cfg(feature = "zmq-transport")]
    pub use crate::transports::zmq::{ZmqPub, ZmqSub};
}
