// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Generic 3D voxel containers and the colour types stored in them.

mod color;
mod grid;
mod shared;
mod value;

pub use color::{ColorVoxelGrid, Rgb565, Rgb888, VoxelColor};
pub use grid::{GridOffset, SlabMut, VoxelGrid};
pub use shared::SharedVoxels;
pub use value::VoxelValue;
