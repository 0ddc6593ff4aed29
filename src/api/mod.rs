pub mod analyze;
pub mod presets;

pub use analyze::{__path_handle_analyze, __path_handle_pick};
pub use analyze::{handle_analyze, handle_pick, AnalyzeResponse, PickResponse};
pub use presets::{__path_handle_presets, __path_handle_select_preset};
pub use presets::{
    handle_presets, handle_select_preset, PresetEntry, PresetsResponse, SelectPresetRequest,
};
