// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use depthbar_worker::WorkerError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// API error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    InvalidInput,
    NotImplemented,
    ServiceUnavailable,
    Internal,
}

/// API error type, serialized as `{"detail": ...}`
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
#[error("{detail}")]
pub struct ApiError {
    pub detail: String,

    #[serde(skip)]
    pub code: Option<ApiErrorCode>,
}

impl ApiError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: ApiErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn invalid_json() -> Self {
        Self::new("Invalid json body.").with_code(ApiErrorCode::InvalidInput)
    }

    pub fn not_implemented() -> Self {
        Self::new("Not implemented.").with_code(ApiErrorCode::NotImplemented)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(message).with_code(ApiErrorCode::ServiceUnavailable)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message).with_code(ApiErrorCode::Internal)
    }

    /// Existing controllers expect 404 for bad bodies and unsupported methods
    pub fn status_code(&self) -> StatusCode {
        match self.code {
            Some(ApiErrorCode::InvalidInput) | Some(ApiErrorCode::NotImplemented) => {
                StatusCode::NOT_FOUND
            }
            Some(ApiErrorCode::ServiceUnavailable) => StatusCode::SERVICE_UNAVAILABLE,
            Some(ApiErrorCode::Internal) | None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<WorkerError> for ApiError {
    fn from(err: WorkerError) -> Self {
        match err {
            WorkerError::Stopped => ApiError::service_unavailable(err.to_string()),
            _ => ApiError::internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::invalid_json().status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::not_implemented().status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(WorkerError::Stopped).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::new("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_serializes_detail_only() {
        let json = serde_json::to_value(ApiError::invalid_json()).unwrap();
        assert_eq!(json, serde_json::json!({"detail": "Invalid json body."}));
    }
}
