// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use parking_lot::RwLock;
use std::sync::Arc;

/// A grid shared between threads that need multi-cell atomic edits.
///
/// [`SharedVoxels::edit_safe`] holds the write lock for the whole callback, so no
/// two edit sessions interleave and readers never see a half-applied edit.
#[derive(Debug, Default)]
pub struct SharedVoxels<G> {
    inner: Arc<RwLock<G>>,
}

impl<G> Clone for SharedVoxels<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G> SharedVoxels<G> {
    pub fn new(grid: G) -> Self {
        Self {
            inner: Arc::new(RwLock::new(grid)),
        }
    }

    /// Run `editor` with exclusive access to the grid.
    pub fn edit_safe<R>(&self, editor: impl FnOnce(&mut G) -> R) -> R {
        let mut guard = self.inner.write();
        editor(&mut guard)
    }

    /// Run `reader` with shared access to the grid.
    pub fn read<R>(&self, reader: impl FnOnce(&G) -> R) -> R {
        let guard = self.inner.read();
        reader(&guard)
    }

    pub fn snapshot(&self) -> G
    where
        G: Clone,
    {
        self.inner.read().clone()
    }
}
