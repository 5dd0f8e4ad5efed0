// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Barrier-joined parallel iteration.
//!
//! Every entry point of [`ParallelFor`] partitions its index space into disjoint
//! pieces, executes them on a rayon pool and only returns once every piece has
//! completed. Callers never observe a partially finished run.

use crate::error::{VoxelError, VoxelResult};
use rayon::prelude::*;
use std::sync::Arc;

/// Handle to the pool that executes parallel loops.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Debug, Clone, Default)]
pub struct ParallelFor {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl ParallelFor {
    /// Run on the rayon global pool.
    pub fn global() -> Self {
        Self { pool: None }
    }

    /// Run on a dedicated pool with `num_threads` workers (0 = global pool).
    pub fn with_threads(num_threads: usize) -> VoxelResult<Self> {
        if num_threads == 0 {
            return Ok(Self::global());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("depthbar-parallel-{}", index))
            .build()
            .map_err(|e| VoxelError::ThreadPool(e.to_string()))?;

        Ok(Self {
            pool: Some(Arc::new(pool)),
        })
    }

    /// Number of threads that will execute partitions.
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn install<R, OP>(&self, op: OP) -> R
    where
        R: Send,
        OP: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Call `work(i)` for every `i` in `[start, end)`.
    pub fn run<F>(&self, start: usize, end: usize, work: F)
    where
        F: Fn(usize) + Sync + Send,
    {
        if start >= end {
            return;
        }
        self.install(|| (start..end).into_par_iter().for_each(|i| work(i)));
    }

    /// Parallelize over `outer`, iterating `inner` sequentially inside each partition.
    pub fn run_2d<F>(&self, outer: usize, inner: usize, work: F)
    where
        F: Fn(usize, usize) + Sync + Send,
    {
        self.install(|| {
            (0..outer).into_par_iter().for_each(|o| {
                for i in 0..inner {
                    work(o, i);
                }
            })
        });
    }

    /// Split `data` into consecutive partitions of `partition_len` elements and hand
    /// each one, with its partition index, to `work`.
    ///
    /// Partitions are disjoint `&mut` slices, so writers need no locking.
    pub fn run_partitioned<T, F>(&self, data: &mut [T], partition_len: usize, work: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        if partition_len == 0 || data.is_empty() {
            return;
        }
        self.install(|| {
            data.par_chunks_mut(partition_len)
                .enumerate()
                .for_each(|(index, partition)| work(index, partition))
        });
    }

    /// Read-only counterpart of [`ParallelFor::run_partitioned`].
    pub fn run_partitioned_ref<T, F>(&self, data: &[T], partition_len: usize, work: F)
    where
        T: Sync,
        F: Fn(usize, &[T]) + Sync + Send,
    {
        if partition_len == 0 || data.is_empty() {
            return;
        }
        self.install(|| {
            data.par_chunks(partition_len)
                .enumerate()
                .for_each(|(index, partition)| work(index, partition))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_run_visits_every_index_once() {
        let hits: Vec<AtomicUsize> = (0..1000).map(|_| AtomicUsize::new(0)).collect();
        ParallelFor::global().run(0, 1000, |i| {
            hits[i].fetch_add(1, Ordering::Relaxed);
        });
        assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn test_run_with_sub_range() {
        let sum = AtomicUsize::new(0);
        ParallelFor::global().run(10, 20, |i| {
            sum.fetch_add(i, Ordering::Relaxed);
        });
        assert_eq!(sum.load(Ordering::Relaxed), (10..20).sum::<usize>());
    }

    #[test]
    fn test_empty_range_is_noop() {
        let calls = AtomicUsize::new(0);
        ParallelFor::global().run(5, 5, |_| {
            calls.fetch_add(1, Ordering::Relaxed);
        });
        ParallelFor::global().run(7, 3, |_| {
            calls.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_run_2d_covers_grid() {
        let hits: Vec<AtomicUsize> = (0..12 * 7).map(|_| AtomicUsize::new(0)).collect();
        ParallelFor::global().run_2d(12, 7, |o, i| {
            hits[o * 7 + i].fetch_add(1, Ordering::Relaxed);
        });
        assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn test_partitions_are_disjoint() {
        let mut data = vec![0usize; 100];
        ParallelFor::global().run_partitioned(&mut data, 10, |index, partition| {
            assert_eq!(partition.len(), 10);
            for cell in partition.iter_mut() {
                *cell = index;
            }
        });
        for (i, value) in data.iter().enumerate() {
            assert_eq!(*value, i / 10);
        }
    }

    #[test]
    fn test_last_partition_may_be_short() {
        let mut data = vec![0u8; 25];
        let partitions = AtomicUsize::new(0);
        ParallelFor::global().run_partitioned(&mut data, 10, |_, partition| {
            partitions.fetch_add(1, Ordering::Relaxed);
            partition.fill(1);
        });
        assert_eq!(partitions.load(Ordering::Relaxed), 3);
        assert!(data.iter().all(|&b| b == 1));
    }

    #[test]
    fn test_dedicated_pool() {
        let parallel = ParallelFor::with_threads(2).unwrap();
        assert_eq!(parallel.num_threads(), 2);

        let sum = AtomicUsize::new(0);
        parallel.run(0, 100, |i| {
            sum.fetch_add(i, Ordering::Relaxed);
        });
        assert_eq!(sum.load(Ordering::Relaxed), 4950);
    }

    #[test]
    fn test_zero_threads_uses_global_pool() {
        let parallel = ParallelFor::with_threads(0).unwrap();
        assert_eq!(parallel.num_threads(), rayon::current_num_threads());
    }
}
