// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::ops::{Deref, Range};

/// Build `levels` evenly spaced bucket boundaries below `max`.
///
/// `thresholds[i] = i * (max / levels)` with integer division, so the table is
/// always ascending and starts at 0. `levels == 0` yields an empty table.
///
/// ```
/// use depthbar_structures::make_depth_thresholds;
///
/// assert_eq!(make_depth_thresholds(8, 128), vec![0, 16, 32, 48, 64, 80, 96, 112]);
/// ```
pub fn make_depth_thresholds(levels: u32, max: u32) -> Vec<u32> {
    if levels == 0 {
        return Vec::new();
    }
    let step = max / levels;
    (0..levels).map(|i| i * step).collect()
}

/// Ascending depth bucket boundaries, one per display layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthThresholds(Vec<u32>);

impl DepthThresholds {
    pub fn new(levels: u32, max: u32) -> Self {
        Self(make_depth_thresholds(levels, max))
    }

    pub fn levels(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Layers lit by a pixel with the given depth scalar.
    ///
    /// A layer `z` is lit when `thresholds[z] > depth`. The table is ascending, so
    /// the lit layers always form a suffix `first..levels` of the highest layers.
    /// Depth 0 means "no data" and lights nothing.
    pub fn lit_layers(&self, depth: u8) -> Range<usize> {
        let levels = self.levels();
        if depth == 0 {
            return levels..levels;
        }
        let depth = u32::from(depth);
        let first = self.0.partition_point(|&threshold| threshold <= depth);
        first..levels
    }
}

impl Deref for DepthThresholds {
    type Target = [u32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
