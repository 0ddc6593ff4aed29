use axum::{extract::State, response::Json, Json as JsonExtractor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::services::{BackdropService, BackgroundPreset, PresetList};

/// One preset entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PresetEntry {
    pub index: usize,
    /// CSS background value, absent for the dominant-color preset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    pub dominant_color: bool,
    pub removable: bool,
}

/// Current preset list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PresetsResponse {
    pub selected: usize,
    pub presets: Vec<PresetEntry>,
}

/// Request body for selecting a preset
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectPresetRequest {
    pub index: usize,
}

impl From<&PresetList> for PresetsResponse {
    fn from(list: &PresetList) -> Self {
        let presets = list
            .presets()
            .iter()
            .enumerate()
            .map(|(index, preset)| {
                let (css, dominant_color) = match preset {
                    BackgroundPreset::Css(css) => (Some(css.clone()), false),
                    BackgroundPreset::DominantColor => (None, true),
                };
                PresetEntry {
                    index,
                    css,
                    dominant_color,
                    removable: index >= crate::services::presets::BUILTIN_COUNT,
                }
            })
            .collect();

        Self {
            selected: list.selected_index(),
            presets,
        }
    }
}

/// List background presets
#[utoipa::path(
    get,
    path = "/api/presets",
    responses(
        (status = 200, description = "Preset list", body = PresetsResponse),
    ),
    tag = "Presets"
)]
pub async fn handle_presets(State(backdrop): State<Arc<BackdropService>>) -> Json<PresetsResponse> {
    let list = backdrop.presets().await;
    Json(PresetsResponse::from(&list))
}

/// Select a background preset and apply it to every open document
#[utoipa::path(
    put,
    path = "/api/presets/selected",
    request_body = SelectPresetRequest,
    responses(
        (status = 200, description = "Preset selected", body = PresetsResponse),
        (status = 400, description = "No preset at that index"),
    ),
    tag = "Presets"
)]
pub async fn handle_select_preset(
    State(backdrop): State<Arc<BackdropService>>,
    JsonExtractor(request): JsonExtractor<SelectPresetRequest>,
) -> Result<Json<PresetsResponse>, ApiError> {
    backdrop.select_preset(request.index).await?;
    tracing::info!(index = request.index, "Preset selected");

    let list = backdrop.presets().await;
    Ok(Json(PresetsResponse::from(&list)))
}
