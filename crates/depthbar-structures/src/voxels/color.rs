// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Colour cell types and the colour-typed voxel layer.

use super::grid::{GridOffset, VoxelGrid};
use super::value::VoxelValue;
use crate::parallel::ParallelFor;
use bytemuck::{Pod, Zeroable};

/// A colour that can be shown on the display. Off colours count as empty.
pub trait VoxelColor: Copy + Send + Sync {
    fn is_off(&self) -> bool;

    fn to_rgb565(&self) -> Rgb565;
}

/// RGB565 packed into the two bytes the LED controller expects.
///
/// Byte 0 carries the top 5 bits of red and green bits 7..5, byte 1 carries green
/// bits 5..3 and the top 5 bits of blue.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Rgb565([u8; 2]);

impl Rgb565 {
    pub const OFF: Rgb565 = Rgb565([0, 0]);

    #[inline]
    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Rgb565([
            (red & 0xF8) | (green >> 5),
            ((green << 2) & 0xE0) | (blue >> 3),
        ])
    }

    pub const fn from_bytes(bytes: [u8; 2]) -> Self {
        Rgb565(bytes)
    }

    pub const fn to_bytes(self) -> [u8; 2] {
        self.0
    }

    /// Expand back to 8 bits per channel. Bits dropped by packing come back as zero.
    pub fn to_rgb(self) -> Rgb888 {
        let [hi, lo] = self.0;
        Rgb888 {
            red: hi & 0xF8,
            green: ((hi & 0x07) << 5) | ((lo & 0xE0) >> 2),
            blue: (lo & 0x1F) << 3,
        }
    }
}

impl VoxelValue for Rgb565 {
    fn empty() -> Self {
        Rgb565::OFF
    }

    fn is_empty(&self) -> bool {
        *self == Rgb565::OFF
    }
}

impl VoxelColor for Rgb565 {
    fn is_off(&self) -> bool {
        *self == Rgb565::OFF
    }

    fn to_rgb565(&self) -> Rgb565 {
        *self
    }
}

/// 8 bits per channel colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb888 {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb888 {
    pub const OFF: Rgb888 = Rgb888 {
        red: 0,
        green: 0,
        blue: 0,
    };

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

impl VoxelColor for Rgb888 {
    fn is_off(&self) -> bool {
        *self == Rgb888::OFF
    }

    fn to_rgb565(&self) -> Rgb565 {
        Rgb565::from_rgb(self.red, self.green, self.blue)
    }
}

/// Colour layer over a [`VoxelGrid`]. Cells are either unset or hold a colour, and
/// the `for_each` family skips both unset and off cells.
#[derive(Debug, Clone)]
pub struct ColorVoxelGrid<C: VoxelColor> {
    grid: VoxelGrid<Option<C>>,
}

impl<C: VoxelColor> ColorVoxelGrid<C> {
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            grid: VoxelGrid::new(width, height, depth),
        }
    }

    pub fn with_offset(mut self, offset: GridOffset) -> Self {
        self.grid = self.grid.with_offset(offset);
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelFor) -> Self {
        self.grid = self.grid.with_parallel(parallel);
        self
    }

    pub fn dimensions(&self) -> (usize, usize, usize) {
        self.grid.dimensions()
    }

    pub fn is_in_range(&self, x: isize, y: isize, z: isize) -> bool {
        self.grid.is_in_range(x, y, z)
    }

    pub fn set_at(&mut self, x: isize, y: isize, z: isize, color: C) {
        self.grid.set_at(x, y, z, Some(color));
    }

    /// Unset a cell.
    pub fn remove_at(&mut self, x: isize, y: isize, z: isize) {
        self.grid.set_at(x, y, z, None);
    }

    pub fn get_at(&self, x: isize, y: isize, z: isize) -> Option<C> {
        self.grid.get_at(x, y, z)
    }

    pub fn clear(&mut self) {
        self.grid.clear();
    }

    pub fn fill(&mut self, color: C) {
        self.grid.fill(Some(color));
    }

    pub fn for_each<F>(&self, mut callback: F)
    where
        F: FnMut(isize, isize, isize, C),
    {
        self.grid.for_each(|x, y, z, cell| {
            if let Some(color) = cell {
                if !color.is_off() {
                    callback(x, y, z, color);
                }
            }
        });
    }

    pub fn concurrent_for_each<F>(&self, callback: F)
    where
        F: Fn(isize, isize, isize, C) + Sync + Send,
    {
        self.grid.concurrent_for_each(|x, y, z, cell| {
            if let Some(color) = cell {
                if !color.is_off() {
                    callback(x, y, z, color);
                }
            }
        });
    }

    /// Visit every cell, unset and off ones included.
    pub fn concurrent_for_each_all<F>(&self, callback: F)
    where
        F: Fn(isize, isize, isize, Option<C>) + Sync + Send,
    {
        self.grid.concurrent_for_each_all(callback);
    }

    /// Pack into the RGB565 wire layout. Unset cells become [`Rgb565::OFF`].
    pub fn to_packed(&self) -> VoxelGrid<Rgb565> {
        self.grid
            .map(|cell| cell.map_or(Rgb565::OFF, |color| color.to_rgb565()))
    }

    pub fn as_grid(&self) -> &VoxelGrid<Option<C>> {
        &self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb565_packing() {
        assert_eq!(Rgb565::from_rgb(0xFF, 0xFF, 0xFF).to_bytes(), [0xFF, 0xFF]);
        assert_eq!(Rgb565::from_rgb(0, 0, 0).to_bytes(), [0x00, 0x00]);
        assert_eq!(Rgb565::from_rgb(0xFF, 0, 0).to_bytes(), [0xF8, 0x00]);
        assert_eq!(Rgb565::from_rgb(0, 0xFF, 0).to_bytes(), [0x07, 0xE0]);
        assert_eq!(Rgb565::from_rgb(0, 0, 0xFF).to_bytes(), [0x00, 0x1F]);
        // low bits below the channel precision are dropped
        assert_eq!(Rgb565::from_rgb(0x07, 0x03, 0x07).to_bytes(), [0x00, 0x00]);
    }

    #[test]
    fn test_rgb565_unpack() {
        let color = Rgb565::from_rgb(0xA8, 0x54, 0x38);
        assert_eq!(color.to_rgb(), Rgb888::new(0xA8, 0x50, 0x38));
        assert_eq!(
            Rgb565::from_rgb(0xFF, 0xFF, 0xFF).to_rgb(),
            Rgb888::new(0xF8, 0xF8, 0xF8)
        );
    }

    #[test]
    fn test_off_colors() {
        assert!(Rgb565::OFF.is_off());
        assert!(Rgb888::OFF.is_off());
        assert!(!Rgb888::new(1, 0, 0).is_off());
    }

    #[test]
    fn test_color_layer_skips_off_and_unset() {
        let mut grid = ColorVoxelGrid::<Rgb888>::new(2, 2, 2);
        grid.set_at(0, 0, 0, Rgb888::new(10, 20, 30));
        grid.set_at(1, 1, 1, Rgb888::OFF);

        let mut seen = Vec::new();
        grid.for_each(|x, y, z, c| seen.push((x, y, z, c)));
        assert_eq!(seen, vec![(0, 0, 0, Rgb888::new(10, 20, 30))]);

        let all = std::sync::atomic::AtomicUsize::new(0);
        grid.concurrent_for_each_all(|_, _, _, _| {
            all.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        });
        assert_eq!(all.into_inner(), 8);
    }

    #[test]
    fn test_to_packed() {
        let mut grid = ColorVoxelGrid::<Rgb888>::new(1, 1, 2);
        grid.set_at(0, 0, 1, Rgb888::new(0xFF, 0, 0));
        let packed = grid.to_packed();
        assert_eq!(packed.as_bytes(), &[0x00, 0x00, 0xF8, 0x00]);
    }
}
