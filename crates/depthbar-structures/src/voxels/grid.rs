// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Dense 3D voxel container.
//!
//! Cells are stored flat in `[x][y][z]` order, `index = x*H*D + y*D + z`, so one
//! x value owns a contiguous slab of `H*D` cells. Parallel operations split the
//! grid along x, which gives every partition a disjoint `&mut` slab.

use super::value::VoxelValue;
use crate::error::{VoxelError, VoxelResult};
use crate::parallel::ParallelFor;
use bytemuck::Pod;
use ndarray::ArrayView3;

/// Shift between logical coordinates and storage coordinates.
///
/// A logical `(x, y, z)` addresses storage cell `(x + offset.x, y + offset.y, z + offset.z)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridOffset {
    pub x: isize,
    pub y: isize,
    pub z: isize,
}

impl GridOffset {
    pub const fn new(x: isize, y: isize, z: isize) -> Self {
        Self { x, y, z }
    }
}

/// Dense `width x height x depth` grid of `T` with bounds-checked logical addressing.
#[derive(Debug, Clone)]
pub struct VoxelGrid<T: VoxelValue> {
    data: Vec<T>,
    width: usize,
    height: usize,
    depth: usize,
    offset: GridOffset,
    parallel: ParallelFor,
}

impl<T: VoxelValue> VoxelGrid<T> {
    /// Grid with every cell set to [`VoxelValue::empty`].
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            data: vec![T::empty(); width * height * depth],
            width,
            height,
            depth,
            offset: GridOffset::default(),
            parallel: ParallelFor::global(),
        }
    }

    pub fn with_offset(mut self, offset: GridOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Pool used by `clear`, `fill` and the concurrent iterators.
    pub fn with_parallel(mut self, parallel: ParallelFor) -> Self {
        self.parallel = parallel;
        self
    }

    /// `(width, height, depth)`
    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    pub fn offset(&self) -> GridOffset {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn slab_len(&self) -> usize {
        self.height * self.depth
    }

    fn storage_coords(&self, x: isize, y: isize, z: isize) -> Option<(usize, usize, usize)> {
        let sx = usize::try_from(x.checked_add(self.offset.x)?).ok()?;
        let sy = usize::try_from(y.checked_add(self.offset.y)?).ok()?;
        let sz = usize::try_from(z.checked_add(self.offset.z)?).ok()?;
        if sx < self.width && sy < self.height && sz < self.depth {
            Some((sx, sy, sz))
        } else {
            None
        }
    }

    fn storage_index(&self, x: isize, y: isize, z: isize) -> Option<usize> {
        self.storage_coords(x, y, z)
            .map(|(sx, sy, sz)| sx * self.slab_len() + sy * self.depth + sz)
    }

    /// Logical coordinates of storage cell `(sx, sy, sz)`.
    fn logical(&self, sx: usize, sy: usize, sz: usize) -> (isize, isize, isize) {
        (
            sx as isize - self.offset.x,
            sy as isize - self.offset.y,
            sz as isize - self.offset.z,
        )
    }

    pub fn is_in_range(&self, x: isize, y: isize, z: isize) -> bool {
        self.storage_coords(x, y, z).is_some()
    }

    /// Write a cell. Out-of-range writes are ignored.
    pub fn set_at(&mut self, x: isize, y: isize, z: isize, value: T) {
        if let Some(index) = self.storage_index(x, y, z) {
            self.data[index] = value;
        }
    }

    /// Read a cell. Out-of-range reads return [`VoxelValue::empty`].
    pub fn get_at(&self, x: isize, y: isize, z: isize) -> T {
        match self.storage_index(x, y, z) {
            Some(index) => self.data[index],
            None => T::empty(),
        }
    }

    /// Reset every cell to empty, in parallel.
    pub fn clear(&mut self) {
        self.fill(T::empty());
    }

    /// Set every cell to `value`, in parallel.
    pub fn fill(&mut self, value: T) {
        let slab_len = self.slab_len();
        self.parallel
            .run_partitioned(&mut self.data, slab_len, |_, slab| slab.fill(value));
    }

    /// Overwrite this grid with the contents of `other`.
    pub fn copy_from(&mut self, other: &VoxelGrid<T>) -> VoxelResult<()> {
        if self.dimensions() != other.dimensions() {
            return Err(VoxelError::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Visit non-empty cells sequentially in storage order.
    pub fn for_each<F>(&self, mut callback: F)
    where
        F: FnMut(isize, isize, isize, T),
    {
        for sx in 0..self.width {
            for sy in 0..self.height {
                for sz in 0..self.depth {
                    let value = self.data[sx * self.slab_len() + sy * self.depth + sz];
                    if !value.is_empty() {
                        let (x, y, z) = self.logical(sx, sy, sz);
                        callback(x, y, z, value);
                    }
                }
            }
        }
    }

    /// Visit non-empty cells in parallel. Visit order is unspecified.
    pub fn concurrent_for_each<F>(&self, callback: F)
    where
        F: Fn(isize, isize, isize, T) + Sync + Send,
    {
        self.concurrent_visit(|x, y, z, value| {
            if !value.is_empty() {
                callback(x, y, z, value);
            }
        });
    }

    /// Visit every cell, empty ones included, in parallel.
    pub fn concurrent_for_each_all<F>(&self, callback: F)
    where
        F: Fn(isize, isize, isize, T) + Sync + Send,
    {
        self.concurrent_visit(callback);
    }

    fn concurrent_visit<F>(&self, callback: F)
    where
        F: Fn(isize, isize, isize, T) + Sync + Send,
    {
        let depth = self.depth;
        self.parallel
            .run_partitioned_ref(&self.data, self.slab_len(), |sx, slab| {
                for (i, value) in slab.iter().enumerate() {
                    let (x, y, z) = self.logical(sx, i / depth, i % depth);
                    callback(x, y, z, *value);
                }
            });
    }

    /// Mutate the grid one x-slab at a time, in parallel.
    ///
    /// `editor` receives the storage x index and exclusive access to that slab.
    /// Returns once every slab has been edited.
    pub fn concurrent_edit_slabs<F>(&mut self, editor: F)
    where
        F: Fn(usize, SlabMut<'_, T>) + Sync + Send,
    {
        let (height, depth) = (self.height, self.depth);
        let slab_len = self.slab_len();
        self.parallel
            .run_partitioned(&mut self.data, slab_len, |sx, cells| {
                editor(
                    sx,
                    SlabMut {
                        cells,
                        height,
                        depth,
                    },
                )
            });
    }

    /// New grid of the same shape with `f` applied to every cell.
    pub fn map<U, F>(&self, f: F) -> VoxelGrid<U>
    where
        U: VoxelValue,
        F: Fn(T) -> U,
    {
        VoxelGrid {
            data: self.data.iter().map(|value| f(*value)).collect(),
            width: self.width,
            height: self.height,
            depth: self.depth,
            offset: self.offset,
            parallel: self.parallel.clone(),
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Storage-ordered `(x, y, z)` array view.
    pub fn view(&self) -> VoxelResult<ArrayView3<'_, T>> {
        ArrayView3::from_shape((self.width, self.height, self.depth), &self.data)
            .map_err(|e| VoxelError::InternalError(e.to_string()))
    }
}

impl<T: VoxelValue + Pod> VoxelGrid<T> {
    /// Raw bytes in storage order, ready to publish.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

impl<T: VoxelValue + PartialEq> PartialEq for VoxelGrid<T> {
    fn eq(&self, other: &Self) -> bool {
        self.dimensions() == other.dimensions()
            && self.offset == other.offset
            && self.data == other.data
    }
}

/// Exclusive access to one x-slab (`height * depth` cells) of a [`VoxelGrid`].
///
/// Coordinates are storage coordinates local to the slab.
pub struct SlabMut<'a, T> {
    cells: &'a mut [T],
    height: usize,
    depth: usize,
}

impl<'a, T: VoxelValue> SlabMut<'a, T> {
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn get(&self, y: usize, z: usize) -> T {
        self.cells[y * self.depth + z]
    }

    pub fn set(&mut self, y: usize, z: usize, value: T) {
        self.cells[y * self.depth + z] = value;
    }

    /// The `depth` cells of row `y`, ordered by z.
    pub fn column_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.depth;
        &mut self.cells[start..start + self.depth]
    }

    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;

    #[test]
    fn test_get_and_set() {
        let mut grid = VoxelGrid::<u16>::new(3, 4, 5);
        grid.set_at(2, 3, 4, 7);
        assert_eq!(grid.get_at(2, 3, 4), 7);
        assert_eq!(grid.as_slice()[2 * 20 + 3 * 5 + 4], 7);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut grid = VoxelGrid::<u16>::new(2, 2, 2);
        grid.set_at(-1, 0, 0, 9);
        grid.set_at(2, 0, 0, 9);
        grid.set_at(0, 0, 2, 9);
        grid.set_at(isize::MAX, 0, 0, 9);
        assert!(grid.as_slice().iter().all(|&v| v == 0));
        assert_eq!(grid.get_at(5, 5, 5), 0);
        assert_eq!(grid.get_at(-1, -1, -1), 0);
    }

    #[test]
    fn test_offset_shifts_valid_range() {
        let mut grid = VoxelGrid::<u8>::new(2, 2, 2).with_offset(GridOffset::new(1, 1, 1));
        assert!(grid.is_in_range(-1, -1, -1));
        assert!(grid.is_in_range(0, 0, 0));
        assert!(!grid.is_in_range(1, 0, 0));

        grid.set_at(-1, -1, -1, 3);
        assert_eq!(grid.as_slice()[0], 3);

        let mut seen = Vec::new();
        grid.for_each(|x, y, z, v| seen.push((x, y, z, v)));
        assert_eq!(seen, vec![(-1, -1, -1, 3)]);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut grid = VoxelGrid::<u8>::new(2, 2, 2);
        grid.set_at(1, 1, 1, 5);
        let copy = grid.clone();
        grid.set_at(1, 1, 1, 6);
        grid.set_at(0, 0, 0, 1);
        assert_eq!(copy.get_at(1, 1, 1), 5);
        assert_eq!(copy.get_at(0, 0, 0), 0);
    }

    #[test]
    fn test_fill_and_clear() {
        let mut grid = VoxelGrid::<u32>::new(4, 3, 2);
        grid.fill(11);
        assert!(grid.as_slice().iter().all(|&v| v == 11));
        grid.clear();
        assert!(grid.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_for_each_skips_empty() {
        let mut grid = VoxelGrid::<Option<u8>>::new(3, 3, 3);
        grid.set_at(0, 1, 2, Some(0));
        grid.set_at(2, 2, 2, Some(9));

        let mut seen = Vec::new();
        grid.for_each(|x, y, z, v| seen.push((x, y, z, v)));
        assert_eq!(seen, vec![(0, 1, 2, Some(0)), (2, 2, 2, Some(9))]);
    }

    #[test]
    fn test_concurrent_for_each_matches_sequential() {
        let mut grid = VoxelGrid::<u16>::new(6, 5, 4);
        for x in 0..6 {
            for y in 0..5 {
                for z in 0..4 {
                    if (x + y + z) % 3 == 0 {
                        grid.set_at(x, y, z, (x * 100 + y * 10 + z) as u16 + 1);
                    }
                }
            }
        }

        let mut sequential = HashSet::new();
        grid.for_each(|x, y, z, v| {
            sequential.insert((x, y, z, v));
        });

        let concurrent = Mutex::new(HashSet::new());
        grid.concurrent_for_each(|x, y, z, v| {
            concurrent.lock().insert((x, y, z, v));
        });

        assert_eq!(sequential, concurrent.into_inner());
    }

    #[test]
    fn test_concurrent_for_each_all_visits_every_cell() {
        let grid = VoxelGrid::<u8>::new(3, 4, 5).with_offset(GridOffset::new(0, 2, 0));
        let seen = Mutex::new(HashSet::new());
        grid.concurrent_for_each_all(|x, y, z, _| {
            assert!(grid.is_in_range(x, y, z));
            seen.lock().insert((x, y, z));
        });
        assert_eq!(seen.into_inner().len(), 60);
    }

    #[test]
    fn test_concurrent_edit_slabs_are_disjoint() {
        let mut grid = VoxelGrid::<u32>::new(8, 3, 2);
        grid.concurrent_edit_slabs(|x, mut slab| {
            for y in 0..slab.height() {
                slab.column_mut(y).fill(x as u32 + 1);
            }
        });
        for x in 0..8 {
            for y in 0..3 {
                for z in 0..2 {
                    assert_eq!(grid.get_at(x, y, z), x as u32 + 1);
                }
            }
        }
    }

    #[test]
    fn test_copy_from_checks_dimensions() {
        let mut target = VoxelGrid::<u8>::new(2, 2, 2);
        let mut source = VoxelGrid::<u8>::new(2, 2, 2);
        source.set_at(1, 0, 1, 4);
        target.copy_from(&source).unwrap();
        assert_eq!(target, source);

        let wrong = VoxelGrid::<u8>::new(2, 2, 3);
        assert!(matches!(
            target.copy_from(&wrong),
            Err(VoxelError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_view_uses_storage_order() {
        let mut grid = VoxelGrid::<u8>::new(2, 3, 4);
        grid.set_at(1, 2, 3, 8);
        let view = grid.view().unwrap();
        assert_eq!(view.dim(), (2, 3, 4));
        assert_eq!(view[[1, 2, 3]], 8);
    }

    #[test]
    fn test_zero_sized_grid() {
        let mut grid = VoxelGrid::<u8>::new(0, 5, 5);
        grid.fill(1);
        grid.concurrent_for_each_all(|_, _, _, _| panic!("no cells"));
        assert!(grid.is_empty());
    }
}
