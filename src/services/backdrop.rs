//! Host-side facade tying sampling, the color worker and result dispatch
//! to the set of open documents.

use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::{BackdropError, SampleError};
use crate::models::{AppConfig, CorrelationId, DocumentId, DocumentState, ImageDocument, Rgb};
use crate::services::presets::{BackgroundPreset, PresetError, PresetList, DEFAULT_BACKGROUND};
use crate::services::{
    spawn_worker, DocumentRegistry, ImageSampler, InMemoryRegistry, ResultDispatcher, WorkerHandle,
};

/// How a document ended up with its background
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundOutcome {
    /// A CSS preset was applied directly
    Preset(String),
    /// The dominant color arrived and was applied
    Applied(Rgb),
    /// No result within the timeout; the default background was applied
    TimedOut,
    /// The document went away (or was re-sampled) before the result arrived
    Dropped,
}

/// An analysis request in flight for one document
struct Submission {
    document: Arc<ImageDocument>,
    correlation_id: CorrelationId,
    result: oneshot::Receiver<Rgb>,
}

pub struct BackdropService {
    config: Arc<AppConfig>,
    sampler: ImageSampler,
    worker: WorkerHandle,
    dispatcher: Arc<ResultDispatcher>,
    registry: Arc<dyn DocumentRegistry>,
    presets: RwLock<PresetList>,
    pump: JoinHandle<()>,
}

impl BackdropService {
    /// Start the color worker and the result pump with an in-memory registry.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: Arc<AppConfig>) -> Result<Self, BackdropError> {
        Self::with_registry(config, Arc::new(InMemoryRegistry::new()))
    }

    pub fn with_registry(
        config: Arc<AppConfig>,
        registry: Arc<dyn DocumentRegistry>,
    ) -> Result<Self, BackdropError> {
        let (worker, mut results) = spawn_worker(config.clustering)?;
        let dispatcher = Arc::new(ResultDispatcher::new());

        let pump = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                while let Some(message) = results.recv().await {
                    dispatcher.on_message(&message).await;
                }
                tracing::debug!("Result channel closed, pump stopped");
            })
        };

        Ok(Self {
            sampler: ImageSampler::new(&config.sampler),
            presets: RwLock::new(PresetList::from_config(&config.presets)),
            config,
            worker,
            dispatcher,
            registry,
            pump,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<ResultDispatcher> {
        &self.dispatcher
    }

    pub fn registry(&self) -> &Arc<dyn DocumentRegistry> {
        &self.registry
    }

    /// Snapshot of the current preset list
    pub async fn presets(&self) -> PresetList {
        self.presets.read().await.clone()
    }

    /// Register a newly opened document and give it the selected background
    pub async fn open_document(
        &self,
        document: Arc<ImageDocument>,
    ) -> Result<BackgroundOutcome, BackdropError> {
        tracing::debug!(document = %document.id(), "Opened image document");
        self.registry.insert(document.clone()).await;
        let preset = self.presets.read().await.selected().clone();
        self.apply_preset(&document, &preset).await
    }

    /// Tear down a document: it stops matching any outstanding result
    pub async fn close_document(&self, id: &DocumentId) {
        if let Some(document) = self.registry.remove(id).await {
            document.unload();
        }
        let forgotten = self.dispatcher.forget_document(id).await;
        tracing::debug!(document = %id, forgotten, "Closed image document");
    }

    /// Compute and apply the dominant color of one document
    pub async fn apply_dominant_color(
        &self,
        document: &Arc<ImageDocument>,
    ) -> Result<BackgroundOutcome, BackdropError> {
        let deadline = Instant::now() + self.config.result_timeout();
        match self.submit_by(document, deadline).await? {
            Some(submission) => Ok(self.await_submission(submission, deadline).await),
            None => Ok(BackgroundOutcome::TimedOut),
        }
    }

    pub async fn select_preset(&self, index: usize) -> Result<(), PresetError> {
        self.presets.write().await.select(index)?;
        self.apply_selected_to_all().await;
        Ok(())
    }

    /// Add a custom preset, select it and apply it everywhere
    pub async fn add_custom_preset(&self, css: &str) -> Option<usize> {
        let index = self.presets.write().await.add_custom(css)?;
        self.apply_selected_to_all().await;
        Some(index)
    }

    pub async fn remove_preset(&self, index: usize) -> Result<BackgroundPreset, PresetError> {
        let removed = self.presets.write().await.remove(index)?;
        self.apply_selected_to_all().await;
        Ok(removed)
    }

    /// Re-apply the selected preset to every live document.
    ///
    /// Dominant-color requests for all documents are submitted before any
    /// result is awaited. One deadline covers both waiting for documents
    /// that are still loading and waiting for results.
    pub async fn apply_selected_to_all(&self) {
        let preset = self.presets.read().await.selected().clone();
        let documents = self.registry.live_documents().await;

        match preset {
            BackgroundPreset::Css(css) => {
                for document in &documents {
                    document.set_background(css.as_str());
                }
            }
            BackgroundPreset::DominantColor => {
                let deadline = Instant::now() + self.config.result_timeout();
                // Loaded documents go first so a slow load cannot hold them up
                let (ready, loading): (Vec<_>, Vec<_>) =
                    documents.iter().partition(|document| document.is_loaded());

                let mut submissions = Vec::with_capacity(documents.len());
                for document in ready.into_iter().chain(loading) {
                    match self.submit_by(document, deadline).await {
                        Ok(Some(submission)) => submissions.push(submission),
                        Ok(None) => {}
                        Err(e) => {
                            tracing::warn!(document = %document.id(), error = %e, "Dominant color request failed");
                        }
                    }
                }

                for submission in submissions {
                    self.await_submission(submission, deadline).await;
                }
            }
        }
    }

    async fn apply_preset(
        &self,
        document: &Arc<ImageDocument>,
        preset: &BackgroundPreset,
    ) -> Result<BackgroundOutcome, BackdropError> {
        match preset {
            BackgroundPreset::Css(css) => {
                document.set_background(css.as_str());
                Ok(BackgroundOutcome::Preset(css.clone()))
            }
            BackgroundPreset::DominantColor => self.apply_dominant_color(document).await,
        }
    }

    async fn submit(&self, document: &Arc<ImageDocument>) -> Result<Submission, BackdropError> {
        let request = self.sampler.sample(document).await?;
        let correlation_id = request.correlation_id.clone();

        // Track before sending so a fast worker cannot beat the registration
        let result = self
            .dispatcher
            .track(correlation_id.clone(), document)
            .await;
        if let Err(e) = self.worker.submit(request) {
            self.dispatcher.forget(&correlation_id).await;
            return Err(e);
        }

        Ok(Submission {
            document: document.clone(),
            correlation_id,
            result,
        })
    }

    /// Submit a request, giving up at `deadline` if the document is still
    /// loading. A document that misses the deadline gets the default
    /// background and `None` is returned.
    async fn submit_by(
        &self,
        document: &Arc<ImageDocument>,
        deadline: Instant,
    ) -> Result<Option<Submission>, BackdropError> {
        match tokio::time::timeout_at(deadline, self.submit(document)).await {
            Ok(submission) => submission.map(Some),
            Err(_) => {
                if document.state() != DocumentState::Unloaded {
                    document.set_background(DEFAULT_BACKGROUND);
                }
                tracing::warn!(
                    document = %document.id(),
                    timeout_ms = self.config.result_timeout_ms,
                    "Image did not finish loading in time, using default background"
                );
                Ok(None)
            }
        }
    }

    async fn await_submission(&self, submission: Submission, deadline: Instant) -> BackgroundOutcome {
        let Submission {
            document,
            correlation_id,
            result,
        } = submission;

        match tokio::time::timeout_at(deadline, result).await {
            Ok(Ok(color)) => BackgroundOutcome::Applied(color),
            Ok(Err(_)) => BackgroundOutcome::Dropped,
            Err(_) => {
                self.dispatcher.forget(&correlation_id).await;
                // Only touch the document if it is still waiting on this request
                if document.is_loaded() && document.correlation_id().as_ref() == Some(&correlation_id)
                {
                    document.set_background(DEFAULT_BACKGROUND);
                }
                tracing::warn!(
                    %correlation_id,
                    document = %document.id(),
                    timeout_ms = self.config.result_timeout_ms,
                    "Timed out waiting for dominant color, using default background"
                );
                BackgroundOutcome::TimedOut
            }
        }
    }

    /// Decode PNG bytes into a private document and compute its dominant
    /// color. The document is unloaded again afterwards.
    pub async fn analyze_png(
        &self,
        bytes: &[u8],
    ) -> Result<(CorrelationId, BackgroundOutcome), BackdropError> {
        let bitmap = crate::rendering::decode_png(bytes)?;
        // Kept out of the registry so preset changes never re-sample it
        let document = ImageDocument::loaded(DocumentId::generate(), bitmap);

        let outcome = self.apply_dominant_color(&document).await;
        let correlation_id = document.correlation_id();
        document.unload();
        self.dispatcher.forget_document(document.id()).await;

        let outcome = outcome?;
        let correlation_id =
            correlation_id.ok_or_else(|| SampleError::DocumentUnloaded(document.id().to_string()))?;
        Ok((correlation_id, outcome))
    }
}

impl Drop for BackdropService {
    fn drop(&mut self) {
        self.pump.abort();
    }
}
