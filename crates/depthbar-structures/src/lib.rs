// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The core data crate for depthbar.
//!
//! Defines the data model shared by the frame worker and its collaborators:
//!
//! - [`geometry`]: depth threshold tables, frame geometries and the registry that
//!   resolves a raw payload length to its geometry
//! - [`voxels`]: the generic 3D container ([`VoxelGrid`]), its colour layer
//!   ([`ColorVoxelGrid`]), the RGB565 cell type and the lock-guarded
//!   [`SharedVoxels`] wrapper
//! - [`frame`]: a borrowed, column-major view over an RGBD payload
//! - [`parallel`]: [`ParallelFor`], the barrier-joined parallel iteration helper

mod error;
pub mod frame;
pub mod geometry;
pub mod parallel;
pub mod voxels;

pub use error::{VoxelError, VoxelResult};
pub use frame::{RgbdFrame, RgbdPixel, RGBD_BYTES_PER_PIXEL};
pub use geometry::{
    make_depth_thresholds, DepthThresholds, FrameGeometry, FrameGeometryRegistry, GeometrySpec,
    DEFAULT_DEPTH_MAX, DEFAULT_GEOMETRIES,
};
pub use parallel::ParallelFor;
pub use voxels::{
    ColorVoxelGrid, GridOffset, Rgb565, Rgb888, SharedVoxels, SlabMut, VoxelColor, VoxelGrid,
    VoxelValue,
};
