// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use depthbar_structures::VoxelError;
use depthbar_transports::TransportError;
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    /// Opening the ingress or egress socket failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Voxel error: {0}")]
    Voxel(#[from] VoxelError),

    /// The worker thread has already terminated
    #[error("Frame worker is stopped")]
    Stopped,

    /// A worker setting the loop cannot run with
    #[error("Invalid worker configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to spawn frame worker thread: {0}")]
    Spawn(String),
}
