// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use depthbar_worker::{WorkerHandle, WorkerResult};

/// What the control surface needs from the frame worker
pub trait WorkerControl: Send + Sync {
    /// Blocks until the worker has applied the flag
    fn enable(&self, enabled: bool) -> WorkerResult<()>;

    fn is_enabled(&self) -> bool;
}

impl WorkerControl for WorkerHandle {
    fn enable(&self, enabled: bool) -> WorkerResult<()> {
        WorkerHandle::enable(self, enabled)
    }

    fn is_enabled(&self) -> bool {
        WorkerHandle::is_enabled(self)
    }
}
