// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

pub mod control;
pub mod error;

pub use control::WorkerControl;
pub use error::{ApiError, ApiErrorCode, ApiResult};

use serde::{Deserialize, Serialize};

/// Body of `POST /api/config` and `GET /api/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnableStatus {
    /// A missing field reads as `false`
    #[serde(default)]
    pub enable: bool,
}
