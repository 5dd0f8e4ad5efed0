// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Result alias for voxel and geometry operations.
pub type VoxelResult<T> = Result<T, VoxelError>;

/// Common error type for depthbar data operations.
///
/// # Examples
/// ```
/// use depthbar_structures::{GeometrySpec, FrameGeometryRegistry, VoxelError};
///
/// let result = FrameGeometryRegistry::new(&[GeometrySpec::new(0, 50, 15)], 128);
/// assert!(matches!(result, Err(VoxelError::BadParameters(_))));
/// ```
#[derive(Debug, Error)]
pub enum VoxelError {
    /// Invalid parameters provided to a function
    #[error("Bad Parameters: {0}")]
    BadParameters(String),

    /// A payload length that no configured geometry produces
    #[error("Unresolved geometry: no frame geometry matches a payload of {0} bytes")]
    UnresolvedGeometry(usize),

    /// Two grids or a grid and a geometry disagree on dimensions
    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    /// The dedicated rayon pool could not be created
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),

    /// Internal error indicating a bug
    #[error("Internal Error, please raise an issue on Github: {0}")]
    InternalError(String),
}
