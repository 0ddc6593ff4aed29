use axum::{
    body::Bytes,
    extract::{Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::rendering::{decode_png, label_color, pick_color};
use crate::services::{BackdropService, BackgroundOutcome};

/// Dominant color of an uploaded image
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeResponse {
    /// CSS color, e.g. `rgb(30,30,30)`
    pub color: String,
    /// Correlation id the request was tagged with
    pub correlation_id: String,
    /// Readable text color over `color` ("white" or "black")
    pub label_color: String,
}

/// Pixel position for the color picker
#[derive(Debug, Deserialize)]
pub struct PickQuery {
    pub x: u32,
    pub y: u32,
}

/// Color under a point of an uploaded image
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PickResponse {
    pub color: String,
    pub label_color: String,
}

/// Compute the dominant color of a PNG image
///
/// The image is downscaled, clustered on the color worker and the most
/// common color returned.
#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body(content = Vec<u8>, description = "PNG image", content_type = "image/png"),
    responses(
        (status = 200, description = "Dominant color computed", body = AnalyzeResponse),
        (status = 400, description = "Empty or undecodable image"),
        (status = 504, description = "Color worker did not answer in time"),
    ),
    tag = "Analysis"
)]
pub async fn handle_analyze(
    State(backdrop): State<Arc<BackdropService>>,
    body: Bytes,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::EmptyBody);
    }

    tracing::info!(bytes = body.len(), "Analyze request received");

    let (correlation_id, outcome) = backdrop.analyze_png(&body).await?;
    match outcome {
        BackgroundOutcome::Applied(color) => Ok(Json(AnalyzeResponse {
            color: color.to_css(),
            correlation_id: correlation_id.to_string(),
            label_color: label_color(color).to_string(),
        })),
        BackgroundOutcome::TimedOut => Err(ApiError::Timeout),
        other => Err(ApiError::Internal(format!("Unexpected outcome: {other:?}"))),
    }
}

/// Read the color at a point of a PNG image
#[utoipa::path(
    post,
    path = "/api/pick",
    request_body(content = Vec<u8>, description = "PNG image", content_type = "image/png"),
    responses(
        (status = 200, description = "Color at the point", body = PickResponse),
        (status = 400, description = "Empty image, undecodable image or point outside it"),
    ),
    params(
        ("x" = u32, Query, description = "Column"),
        ("y" = u32, Query, description = "Row"),
    ),
    tag = "Analysis"
)]
pub async fn handle_pick(
    Query(point): Query<PickQuery>,
    body: Bytes,
) -> Result<Json<PickResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::EmptyBody);
    }

    let bitmap = decode_png(&body)?;
    let color = pick_color(&bitmap, point.x, point.y).ok_or(ApiError::PointOutside {
        x: point.x,
        y: point.y,
    })?;

    Ok(Json(PickResponse {
        color: color.to_css(),
        label_color: label_color(color).to_string(),
    }))
}
