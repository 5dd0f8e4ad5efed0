// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// A cell type storable in a [`VoxelGrid`](super::VoxelGrid).
///
/// Every cell type has a distinguished "empty" value. Freshly allocated and cleared
/// grids hold it, out-of-range reads return it and the `for_each` family skips it.
pub trait VoxelValue: Copy + Send + Sync {
    fn empty() -> Self;

    fn is_empty(&self) -> bool;
}

impl<T: Copy + Send + Sync> VoxelValue for Option<T> {
    fn empty() -> Self {
        None
    }

    fn is_empty(&self) -> bool {
        self.is_none()
    }
}

macro_rules! impl_voxel_value_for_integer {
    ($($t:ty),*) => {
        $(
            impl VoxelValue for $t {
                fn empty() -> Self {
                    0
                }

                fn is_empty(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

impl_voxel_value_for_integer!(u8, u16, u32, i32);
