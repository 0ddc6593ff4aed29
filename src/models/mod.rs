pub mod analysis;
pub mod color;
pub mod config;
pub mod document;
pub mod image_buffer;

pub use analysis::{AnalysisRequest, AnalysisResult, CorrelationId, WireError};
pub use color::{ParseRgbError, Rgb};
pub use config::{AppConfig, ClusterParams, ConfigError, PresetConfig, SamplerConfig};
pub use document::{DocumentId, DocumentState, ImageDocument};
pub use image_buffer::{ImageBuffer, BYTES_PER_PIXEL};
