use serde::Deserialize;
use std::path::Path;

/// Application configuration loaded from backdrop.yaml
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// How long a caller waits for a dominant-color result before falling
    /// back to the default background
    pub result_timeout_ms: u64,

    pub sampler: SamplerConfig,

    pub clustering: ClusterParams,

    pub presets: PresetConfig,
}

/// Downscaling before analysis
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SamplerConfig {
    /// Neither side of the sampled canvas exceeds this many pixels
    pub max_dimension: u32,
}

/// Parameters of the first-fit clustering pass
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ClusterParams {
    /// A sample joins a cluster when every channel differs by strictly less
    pub threshold: u8,

    /// Sampling stride along the longer image axis
    pub long_stride: u32,

    /// Sampling stride along the shorter image axis
    pub short_stride: u32,
}

/// Custom presets and initial selection
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PresetConfig {
    /// Extra CSS background values appended after the built-in presets
    pub custom: Vec<String>,

    /// Index into the full preset list (built-ins first)
    pub selected: usize,
}

/// Error loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            result_timeout_ms: 5000,
            sampler: SamplerConfig::default(),
            clustering: ClusterParams::default(),
            presets: PresetConfig::default(),
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { max_dimension: 200 }
    }
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            threshold: 20,
            long_stride: 3,
            short_stride: 2,
        }
    }
}

impl AppConfig {
    /// Parse configuration from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration, falling back to defaults when the file is
    /// missing or invalid
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file configured, using defaults");
            return Self::default();
        };

        match Self::from_file(path) {
            Ok(config) => {
                tracing::info!(
                    path = %path.display(),
                    custom_presets = config.presets.custom.len(),
                    selected = config.presets.selected,
                    "Loaded configuration"
                );
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    pub fn result_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.result_timeout_ms)
    }
}
