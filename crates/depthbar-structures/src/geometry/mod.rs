// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Frame geometry: supported resolutions, their depth threshold tables and the
//! registry that maps a raw payload length to one of them.

mod registry;
mod thresholds;

pub use registry::{
    FrameGeometry, FrameGeometryRegistry, GeometrySpec, DEFAULT_DEPTH_MAX, DEFAULT_GEOMETRIES,
};
pub use thresholds::{make_depth_thresholds, DepthThresholds};
