use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::WireError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Empty request body")]
    EmptyBody,

    #[error("Sampling error: {0}")]
    Sample(#[from] SampleError),

    #[error("Point {x},{y} is outside the image")]
    PointOutside { x: u32, y: u32 },

    #[error("Timed out waiting for color analysis")]
    Timeout,

    #[error("Preset error: {0}")]
    Preset(#[from] crate::services::presets::PresetError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<BackdropError> for ApiError {
    fn from(e: BackdropError) -> Self {
        match e {
            BackdropError::Sample(e) => ApiError::Sample(e),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("PNG decode error: {0}")]
    Decode(String),

    #[error("Image has no pixels")]
    EmptyImage,

    #[error("Unsupported dimensions: {width}x{height}")]
    UnsupportedDimensions { width: u32, height: u32 },

    #[error("Failed to allocate canvas")]
    CanvasAllocation,

    #[error("Document unloaded before sampling: {0}")]
    DocumentUnloaded(String),
}

impl From<png::DecodingError> for SampleError {
    fn from(e: png::DecodingError) -> Self {
        SampleError::Decode(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum BackdropError {
    #[error("Sampling error: {0}")]
    Sample(#[from] SampleError),

    #[error("Wire error: {0}")]
    Wire(#[from] WireError),

    #[error("Color worker is not running")]
    WorkerGone,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::EmptyBody => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Sample(SampleError::DocumentUnloaded(_)) => {
                (StatusCode::GONE, self.to_string())
            }
            ApiError::Sample(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::PointOutside { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Timeout => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            ApiError::Preset(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": message,
        }));

        (status, body).into_response()
    }
}
