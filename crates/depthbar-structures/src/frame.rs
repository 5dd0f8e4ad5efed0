// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Borrowed view over a raw RGBD camera payload.

use crate::error::{VoxelError, VoxelResult};
use crate::geometry::FrameGeometry;
use crate::voxels::Rgb565;

/// Bytes per RGBD pixel: blue, green, red, depth.
pub const RGBD_BYTES_PER_PIXEL: usize = 4;

/// One decoded RGBD pixel. A `depth` of 0 means the sensor had no reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RgbdPixel {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
    pub depth: u8,
}

impl RgbdPixel {
    pub fn to_rgb565(self) -> Rgb565 {
        Rgb565::from_rgb(self.red, self.green, self.blue)
    }

    pub fn has_depth(&self) -> bool {
        self.depth != 0
    }
}

/// Column-major RGBD frame: pixel `(x, y)` lives at byte `y*4 + x*height*4`.
#[derive(Debug, Clone, Copy)]
pub struct RgbdFrame<'a> {
    bytes: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> RgbdFrame<'a> {
    /// Wrap `bytes` for the given geometry, checking the length matches exactly.
    pub fn new(bytes: &'a [u8], geometry: &FrameGeometry) -> VoxelResult<Self> {
        Self::with_dimensions(bytes, geometry.width(), geometry.height())
    }

    pub fn with_dimensions(bytes: &'a [u8], width: usize, height: usize) -> VoxelResult<Self> {
        let expected = width * height * RGBD_BYTES_PER_PIXEL;
        if bytes.len() != expected {
            return Err(VoxelError::BadParameters(format!(
                "RGBD payload for {}x{} must be {} bytes, got {}",
                width,
                height,
                expected,
                bytes.len()
            )));
        }
        Ok(Self {
            bytes,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Pixel at `(x, y)`. Panics when out of range, like slice indexing.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> RgbdPixel {
        let offset = y * RGBD_BYTES_PER_PIXEL + x * self.height * RGBD_BYTES_PER_PIXEL;
        let p = &self.bytes[offset..offset + RGBD_BYTES_PER_PIXEL];
        RgbdPixel {
            blue: p[0],
            green: p[1],
            red: p[2],
            depth: p[3],
        }
    }

    /// Raw bytes of column `x`, `height * 4` bytes long.
    pub fn column(&self, x: usize) -> &'a [u8] {
        let stride = self.height * RGBD_BYTES_PER_PIXEL;
        &self.bytes[x * stride..(x + 1) * stride]
    }
}
