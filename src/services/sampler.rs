use crate::error::SampleError;
use crate::models::{AnalysisRequest, CorrelationId, ImageDocument, SamplerConfig};
use crate::rendering::{render_scaled, scale_ratio};

/// Host-side image sampler.
///
/// Turns a loaded document into a downscaled, correlation-tagged
/// [`AnalysisRequest`].
pub struct ImageSampler {
    max_dimension: u32,
}

impl ImageSampler {
    pub fn new(config: &SamplerConfig) -> Self {
        Self {
            max_dimension: config.max_dimension,
        }
    }

    /// Sample a document, waiting for its bitmap to finish loading first.
    ///
    /// Records a fresh correlation id on the document.
    pub async fn sample(&self, doc: &ImageDocument) -> Result<AnalysisRequest, SampleError> {
        if !doc.is_loaded() {
            tracing::debug!(document = %doc.id(), "Image not decoded yet, waiting for load");
            doc.wait_until_loaded().await?;
        }

        let pixels = doc
            .with_bitmap(|bitmap| {
                let ratio = scale_ratio(bitmap.width(), bitmap.height(), self.max_dimension);
                tracing::debug!(
                    document = %doc.id(),
                    width = bitmap.width(),
                    height = bitmap.height(),
                    ratio,
                    "Sampling image"
                );
                render_scaled(bitmap, ratio)
            })
            .ok_or_else(|| SampleError::DocumentUnloaded(doc.id().to_string()))??;

        let correlation_id = CorrelationId::generate();
        doc.record_correlation_id(correlation_id.clone());

        Ok(AnalysisRequest::new(pixels, correlation_id))
    }
}
