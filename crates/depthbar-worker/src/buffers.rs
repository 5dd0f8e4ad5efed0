// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Double buffering of rendered voxel frames
//!
//! The worker renders into a spare buffer while the last published one stays
//! readable through [`LatestFrame`]. A buffer is only handed back for reuse once
//! no reader holds it, so readers never see a frame being overwritten.

use depthbar_structures::{FrameGeometry, GeometrySpec, ParallelFor, Rgb565, VoxelGrid};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A voxel buffer that was published on the egress channel.
#[derive(Debug)]
pub struct PublishedFrame {
    geometry: GeometrySpec,
    sequence: u64,
    voxels: VoxelGrid<Rgb565>,
}

impl PublishedFrame {
    pub fn geometry(&self) -> GeometrySpec {
        self.geometry
    }

    /// 1 for the first published frame, increasing by one per publish
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn voxels(&self) -> &VoxelGrid<Rgb565> {
        &self.voxels
    }

    /// The exact bytes that were sent
    pub fn as_bytes(&self) -> &[u8] {
        self.voxels.as_bytes()
    }
}

/// Read side of the double buffer, shared with worker handles
#[derive(Debug, Clone, Default)]
pub struct LatestFrame {
    slot: Arc<RwLock<Option<Arc<PublishedFrame>>>>,
}

impl LatestFrame {
    pub fn get(&self) -> Option<Arc<PublishedFrame>> {
        self.slot.read().clone()
    }

    fn replace(&self, frame: Arc<PublishedFrame>) -> Option<Arc<PublishedFrame>> {
        self.slot.write().replace(frame)
    }
}

/// Write side of the double buffer, owned by the worker thread
pub(crate) struct FrameBuffers {
    spares: HashMap<usize, VoxelGrid<Rgb565>>,
    latest: LatestFrame,
    parallel: ParallelFor,
    published: u64,
}

impl FrameBuffers {
    pub(crate) fn new(latest: LatestFrame, parallel: ParallelFor) -> Self {
        Self {
            spares: HashMap::new(),
            latest,
            parallel,
            published: 0,
        }
    }

    /// A buffer to render `geometry` into. Never the published one.
    pub(crate) fn checkout(&mut self, geometry: &FrameGeometry) -> VoxelGrid<Rgb565> {
        self.spares
            .remove(&geometry.payload_len())
            .unwrap_or_else(|| geometry.new_voxel_buffer(self.parallel.clone()))
    }

    /// Return a buffer that was not published
    pub(crate) fn checkin(&mut self, geometry: &FrameGeometry, voxels: VoxelGrid<Rgb565>) {
        self.spares.insert(geometry.payload_len(), voxels);
    }

    /// Make `voxels` the latest frame and recycle the previous one if no reader holds it
    pub(crate) fn commit(&mut self, geometry: &FrameGeometry, voxels: VoxelGrid<Rgb565>) -> u64 {
        self.published += 1;
        let frame = Arc::new(PublishedFrame {
            geometry: geometry.spec(),
            sequence: self.published,
            voxels,
        });

        if let Some(previous) = self.latest.replace(frame) {
            if let Ok(previous) = Arc::try_unwrap(previous) {
                self.spares
                    .insert(previous.geometry.payload_len(), previous.voxels);
            }
        }
        self.published
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> FrameGeometry {
        FrameGeometry::new(GeometrySpec::new(2, 2, 4), 128).unwrap()
    }

    #[test]
    fn test_commit_exposes_latest() {
        let geometry = geometry();
        let latest = LatestFrame::default();
        let mut buffers = FrameBuffers::new(latest.clone(), ParallelFor::global());
        assert!(latest.get().is_none());

        let mut voxels = buffers.checkout(&geometry);
        voxels.set_at(1, 1, 3, Rgb565::from_rgb(255, 255, 255));
        assert_eq!(buffers.commit(&geometry, voxels), 1);

        let frame = latest.get().unwrap();
        assert_eq!(frame.sequence(), 1);
        assert_eq!(frame.geometry(), geometry.spec());
        assert_eq!(frame.as_bytes().len(), geometry.voxel_byte_len());
        assert_ne!(frame.voxels().get_at(1, 1, 3), Rgb565::OFF);
    }

    #[test]
    fn test_held_frame_is_never_recycled() {
        let geometry = geometry();
        let latest = LatestFrame::default();
        let mut buffers = FrameBuffers::new(latest.clone(), ParallelFor::global());

        let mut voxels = buffers.checkout(&geometry);
        voxels.fill(Rgb565::from_rgb(255, 0, 0));
        buffers.commit(&geometry, voxels);
        let held = latest.get().unwrap();

        // The reader keeps the first frame, so the next render gets a fresh buffer
        let mut next = buffers.checkout(&geometry);
        next.clear();
        buffers.commit(&geometry, next);

        assert!(held.as_bytes().iter().any(|&b| b != 0));
        assert_eq!(latest.get().unwrap().sequence(), 2);
    }

    #[test]
    fn test_released_frame_is_recycled() {
        let geometry = geometry();
        let latest = LatestFrame::default();
        let mut buffers = FrameBuffers::new(latest, ParallelFor::global());

        let first = buffers.checkout(&geometry);
        buffers.commit(&geometry, first);
        let second = buffers.checkout(&geometry);
        buffers.commit(&geometry, second);

        // The first frame went back to the spares when the second replaced it
        assert_eq!(buffers.spares.len(), 1);
        let _third = buffers.checkout(&geometry);
        assert!(buffers.spares.is_empty());
    }
}
