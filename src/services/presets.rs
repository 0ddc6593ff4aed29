//! Background presets: built-in backgrounds, the dominant-color entry and
//! user-added CSS values.

use serde::Serialize;

use crate::models::PresetConfig;

/// The image viewer's stock dark noise background
pub const DEFAULT_BACKGROUND: &str =
    "url('chrome://global/skin/media/imagedoc-darknoise.png') repeat scroll 0% 0% rgb(30,30,30)";

/// Number of presets that cannot be removed
pub const BUILTIN_COUNT: usize = 4;

/// A selectable background
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BackgroundPreset {
    /// Literal CSS `background` value
    Css(String),
    /// Color computed from the image itself
    DominantColor,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PresetError {
    #[error("Preset {0} is built in and cannot be removed")]
    BuiltIn(usize),

    #[error("No preset at index {index} ({len} presets)")]
    OutOfRange { index: usize, len: usize },
}

/// Ordered preset list with a selection that always points at a preset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetList {
    presets: Vec<BackgroundPreset>,
    selected: usize,
}

fn builtins() -> Vec<BackgroundPreset> {
    vec![
        BackgroundPreset::Css(DEFAULT_BACKGROUND.to_string()),
        BackgroundPreset::Css("white".to_string()),
        BackgroundPreset::Css("rgb(128,128,128)".to_string()),
        BackgroundPreset::DominantColor,
    ]
}

impl PresetList {
    /// Built-in presets followed by the configured custom ones.
    ///
    /// An out-of-range selection falls back to the default background.
    pub fn from_config(config: &PresetConfig) -> Self {
        let mut presets = builtins();
        presets.extend(
            config
                .custom
                .iter()
                .filter(|css| !css.trim().is_empty())
                .map(|css| BackgroundPreset::Css(css.clone())),
        );

        let selected = if config.selected < presets.len() {
            config.selected
        } else {
            tracing::warn!(
                selected = config.selected,
                presets = presets.len(),
                "Selected preset out of range, resetting to default"
            );
            0
        };

        Self { presets, selected }
    }

    pub fn presets(&self) -> &[BackgroundPreset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> &BackgroundPreset {
        &self.presets[self.selected]
    }

    /// User-added CSS values, for handing to a preference store
    pub fn custom(&self) -> Vec<String> {
        self.presets[BUILTIN_COUNT..]
            .iter()
            .filter_map(|p| match p {
                BackgroundPreset::Css(css) => Some(css.clone()),
                BackgroundPreset::DominantColor => None,
            })
            .collect()
    }

    pub fn select(&mut self, index: usize) -> Result<&BackgroundPreset, PresetError> {
        if index >= self.presets.len() {
            return Err(PresetError::OutOfRange {
                index,
                len: self.presets.len(),
            });
        }
        self.selected = index;
        Ok(&self.presets[index])
    }

    /// Append a custom CSS background and select it.
    ///
    /// Returns `None` for empty input.
    pub fn add_custom(&mut self, css: &str) -> Option<usize> {
        let css = css.trim();
        if css.is_empty() {
            return None;
        }
        self.presets.push(BackgroundPreset::Css(css.to_string()));
        self.selected = self.presets.len() - 1;
        Some(self.selected)
    }

    /// Remove a custom preset.
    ///
    /// Removing the selected preset selects the one that takes its place
    /// (or the new last preset); removing one before the selection keeps
    /// the same preset selected.
    pub fn remove(&mut self, index: usize) -> Result<BackgroundPreset, PresetError> {
        if index < BUILTIN_COUNT {
            return Err(PresetError::BuiltIn(index));
        }
        if index >= self.presets.len() {
            return Err(PresetError::OutOfRange {
                index,
                len: self.presets.len(),
            });
        }

        let removed = self.presets.remove(index);
        let last = self.presets.len() - 1;
        if index == self.selected {
            self.selected = index.min(last);
        } else if index < self.selected {
            self.selected -= 1;
        }
        Ok(removed)
    }
}

impl Default for PresetList {
    fn default() -> Self {
        Self::from_config(&PresetConfig::default())
    }
}
