// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Payload-length to frame geometry resolution.

use super::thresholds::DepthThresholds;
use crate::error::{VoxelError, VoxelResult};
use crate::frame::RGBD_BYTES_PER_PIXEL;
use crate::parallel::ParallelFor;
use crate::voxels::{Rgb565, VoxelGrid};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

/// Upper bound handed to the threshold table when none is configured.
pub const DEFAULT_DEPTH_MAX: u32 = 128;

/// Geometries supported out of the box.
pub const DEFAULT_GEOMETRIES: [GeometrySpec; 2] = [
    GeometrySpec::new(15, 50, 15),
    GeometrySpec::new(30, 100, 30),
];

/// `(width, height, depth_levels)` of a supported input resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeometrySpec {
    pub width: u32,
    pub height: u32,
    pub depth_levels: u32,
}

impl GeometrySpec {
    pub const fn new(width: u32, height: u32, depth_levels: u32) -> Self {
        Self {
            width,
            height,
            depth_levels,
        }
    }

    /// Byte length of an RGBD payload of this resolution.
    pub const fn payload_len(&self) -> usize {
        self.width as usize * self.height as usize * RGBD_BYTES_PER_PIXEL
    }

    /// Number of voxels in the produced grid.
    pub const fn voxel_count(&self) -> usize {
        self.width as usize * self.height as usize * self.depth_levels as usize
    }

    fn validate(&self) -> VoxelResult<()> {
        if self.width == 0 || self.height == 0 || self.depth_levels == 0 {
            return Err(VoxelError::BadParameters(format!(
                "Geometry dimensions must be non-zero, got {}x{}x{}",
                self.width, self.height, self.depth_levels
            )));
        }
        Ok(())
    }
}

/// Immutable description of one supported frame resolution and its voxel grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameGeometry {
    spec: GeometrySpec,
    thresholds: DepthThresholds,
}

impl FrameGeometry {
    pub fn new(spec: GeometrySpec, depth_max: u32) -> VoxelResult<Self> {
        spec.validate()?;
        Ok(Self {
            spec,
            thresholds: DepthThresholds::new(spec.depth_levels, depth_max),
        })
    }

    pub fn spec(&self) -> GeometrySpec {
        self.spec
    }

    pub fn width(&self) -> usize {
        self.spec.width as usize
    }

    pub fn height(&self) -> usize {
        self.spec.height as usize
    }

    pub fn depth_levels(&self) -> usize {
        self.spec.depth_levels as usize
    }

    /// `(width, height, depth_levels)`
    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.width(), self.height(), self.depth_levels())
    }

    pub fn thresholds(&self) -> &DepthThresholds {
        &self.thresholds
    }

    pub fn payload_len(&self) -> usize {
        self.spec.payload_len()
    }

    /// Byte length of the published RGB565 voxel buffer.
    pub fn voxel_byte_len(&self) -> usize {
        self.spec.voxel_count() * std::mem::size_of::<Rgb565>()
    }

    /// Allocate a zeroed voxel buffer sized for this geometry.
    pub fn new_voxel_buffer(&self, parallel: ParallelFor) -> VoxelGrid<Rgb565> {
        VoxelGrid::new(self.width(), self.height(), self.depth_levels()).with_parallel(parallel)
    }
}

struct RegistryEntry {
    spec: GeometrySpec,
    geometry: OnceLock<Arc<FrameGeometry>>,
}

/// Fixed table of supported geometries, keyed by payload byte length.
///
/// Each [`FrameGeometry`] is built on its first resolution and then shared for
/// the lifetime of the registry. Concurrent first resolutions build it exactly once.
pub struct FrameGeometryRegistry {
    entries: Vec<RegistryEntry>,
    depth_max: u32,
}

impl FrameGeometryRegistry {
    /// Build a registry over `specs`.
    ///
    /// Fails if a spec has a zero dimension, if two specs share a payload length,
    /// or if `depth_max` is zero.
    pub fn new(specs: &[GeometrySpec], depth_max: u32) -> VoxelResult<Self> {
        if depth_max == 0 {
            return Err(VoxelError::BadParameters(
                "depth_max must be greater than 0".to_string(),
            ));
        }

        let mut entries: Vec<RegistryEntry> = Vec::with_capacity(specs.len());
        for spec in specs {
            spec.validate()?;
            if let Some(existing) = entries
                .iter()
                .find(|entry| entry.spec.payload_len() == spec.payload_len())
            {
                return Err(VoxelError::BadParameters(format!(
                    "Geometries {:?} and {:?} share payload length {}",
                    existing.spec,
                    spec,
                    spec.payload_len()
                )));
            }
            entries.push(RegistryEntry {
                spec: *spec,
                geometry: OnceLock::new(),
            });
        }

        Ok(Self { entries, depth_max })
    }

    /// Registry over [`DEFAULT_GEOMETRIES`] with [`DEFAULT_DEPTH_MAX`].
    pub fn with_default_geometries() -> VoxelResult<Self> {
        Self::new(&DEFAULT_GEOMETRIES, DEFAULT_DEPTH_MAX)
    }

    /// Resolve a raw payload length to its geometry, or `None` if unsupported.
    pub fn resolve(&self, payload_len: usize) -> Option<Arc<FrameGeometry>> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.spec.payload_len() == payload_len)?;

        let geometry = entry.geometry.get_or_init(|| {
            Arc::new(FrameGeometry {
                spec: entry.spec,
                thresholds: DepthThresholds::new(entry.spec.depth_levels, self.depth_max),
            })
        });
        Some(Arc::clone(geometry))
    }

    /// Like [`FrameGeometryRegistry::resolve`] but reports the miss as an error.
    pub fn try_resolve(&self, payload_len: usize) -> VoxelResult<Arc<FrameGeometry>> {
        self.resolve(payload_len)
            .ok_or(VoxelError::UnresolvedGeometry(payload_len))
    }

    pub fn specs(&self) -> impl Iterator<Item = GeometrySpec> + '_ {
        self.entries.iter().map(|entry| entry.spec)
    }

    pub fn supported_payload_lengths(&self) -> Vec<usize> {
        self.specs().map(|spec| spec.payload_len()).collect()
    }

    pub fn depth_max(&self) -> u32 {
        self.depth_max
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for FrameGeometryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameGeometryRegistry")
            .field("specs", &self.specs().collect::<Vec<_>>())
            .field("depth_max", &self.depth_max)
            .finish()
    }
}
