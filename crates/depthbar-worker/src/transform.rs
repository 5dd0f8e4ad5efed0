// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Depth-bar rendering
//!
//! Every pixel with a depth reading lights a bar of voxels in its `(x, y)`
//! column: the layers whose threshold is strictly greater than the depth. The
//! thresholds ascend, so the bar always runs from the top layer down to a
//! boundary set by the depth. Nearer objects (smaller depth) get taller bars.

use depthbar_structures::{
    DepthThresholds, Rgb565, RgbdFrame, VoxelError, VoxelGrid, VoxelResult,
};

/// Render `frame` into `voxels`, replacing their previous content.
///
/// Both passes (zero fill, then lighting) are partitioned along x so each
/// partition writes only its own slab. Returns after every slab is written.
pub fn render_depth_bars(
    frame: &RgbdFrame<'_>,
    thresholds: &DepthThresholds,
    voxels: &mut VoxelGrid<Rgb565>,
) -> VoxelResult<()> {
    let expected = voxels.dimensions();
    let actual = (frame.width(), frame.height(), thresholds.levels());
    if expected != actual {
        return Err(VoxelError::DimensionMismatch { expected, actual });
    }

    voxels.clear();

    let height = frame.height();
    voxels.concurrent_edit_slabs(|x, mut slab| {
        for y in 0..height {
            let pixel = frame.pixel(x, y);
            if !pixel.has_depth() {
                continue;
            }
            let layers = thresholds.lit_layers(pixel.depth);
            if layers.is_empty() {
                continue;
            }
            slab.column_mut(y)[layers].fill(pixel.to_rgb565());
        }
    });

    Ok(())
}
