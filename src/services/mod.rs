pub mod backdrop;
pub mod dispatcher;
pub mod document_registry;
pub mod engine;
pub mod presets;
pub mod sampler;
pub mod worker;

pub use backdrop::{BackdropService, BackgroundOutcome};
pub use dispatcher::{DispatchOutcome, ResultDispatcher};
pub use document_registry::{DocumentRegistry, InMemoryRegistry};
pub use engine::ColorEngine;
pub use presets::{BackgroundPreset, PresetError, PresetList, DEFAULT_BACKGROUND};
pub use sampler::ImageSampler;
pub use worker::{spawn_worker, WorkerHandle};
