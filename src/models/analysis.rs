use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{ImageBuffer, Rgb};

/// Opaque token pairing an analysis request with its eventual result.
///
/// Generated ids are shaped like a random (version 4) UUID, 36 characters,
/// but any string received over the wire is accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id with 122 bits of entropy
    pub fn generate() -> Self {
        use rand::Rng;
        let mut bytes: [u8; 16] = rand::thread_rng().gen();
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;

        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        Self(format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pixels submitted for dominant-color analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub pixels: ImageBuffer,
    pub correlation_id: CorrelationId,
}

impl AnalysisRequest {
    pub fn new(pixels: ImageBuffer, correlation_id: CorrelationId) -> Self {
        Self {
            pixels,
            correlation_id,
        }
    }
}

/// Dominant color computed for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub color: Rgb,
    pub correlation_id: CorrelationId,
}

/// Error decoding or encoding a worker message
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

/// `[[pixels, width, height], id]`
#[derive(Serialize, Deserialize)]
struct RequestMessage((Vec<u8>, u32, u32), CorrelationId);

/// `["rgb(R,G,B)", id]`
#[derive(Serialize, Deserialize)]
struct ResultMessage(Rgb, CorrelationId);

impl AnalysisRequest {
    /// Serialize for the host → worker channel
    pub fn to_message(&self) -> Result<String, WireError> {
        let pixels = &self.pixels;
        let message = RequestMessage(
            (pixels.data().to_vec(), pixels.width(), pixels.height()),
            self.correlation_id.clone(),
        );
        Ok(serde_json::to_string(&message)?)
    }

    /// Consuming variant that avoids copying the pixel data
    pub fn into_message(self) -> Result<String, WireError> {
        let (width, height) = (self.pixels.width(), self.pixels.height());
        let message = RequestMessage(
            (self.pixels.into_data(), width, height),
            self.correlation_id,
        );
        Ok(serde_json::to_string(&message)?)
    }

    pub fn from_message(text: &str) -> Result<Self, WireError> {
        let RequestMessage((data, width, height), correlation_id) = serde_json::from_str(text)?;
        Ok(Self::new(
            ImageBuffer::from_rgba(width, height, data),
            correlation_id,
        ))
    }
}

impl AnalysisResult {
    /// Serialize for the worker → host channel
    pub fn to_message(&self) -> Result<String, WireError> {
        let message = ResultMessage(self.color, self.correlation_id.clone());
        Ok(serde_json::to_string(&message)?)
    }

    pub fn from_message(text: &str) -> Result<Self, WireError> {
        let ResultMessage(color, correlation_id) = serde_json::from_str(text)?;
        Ok(Self {
            color,
            correlation_id,
        })
    }
}
