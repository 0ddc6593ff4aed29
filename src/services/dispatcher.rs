use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Instant;
use tokio::sync::{oneshot, Mutex};

use crate::models::{AnalysisResult, CorrelationId, DocumentId, DocumentState, ImageDocument, Rgb};

/// What happened to a result handed to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Background applied to the document
    Applied(DocumentId),
    /// No request with this correlation id is outstanding
    Unmatched,
    /// The requesting document no longer exists
    DocumentGone,
    /// The document has since been re-sampled under a different id
    Superseded,
    /// The document exists but is no longer displaying the image
    NotDisplaying,
    /// The message could not be decoded
    Malformed,
}

struct PendingRequest {
    document: Weak<ImageDocument>,
    waiter: Option<oneshot::Sender<Rgb>>,
    submitted_at: Instant,
}

/// Pairs asynchronous analysis results with the documents that asked for them.
///
/// Holds only weak references: a document that is dropped or torn down
/// simply stops matching.
pub struct ResultDispatcher {
    pending: Mutex<HashMap<CorrelationId, PendingRequest>>,
}

impl ResultDispatcher {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Start waiting for the result tagged `correlation_id`.
    ///
    /// The returned receiver resolves with the applied color, or errors if
    /// the result is dropped or the entry forgotten.
    pub async fn track(
        &self,
        correlation_id: CorrelationId,
        document: &Arc<ImageDocument>,
    ) -> oneshot::Receiver<Rgb> {
        let (tx, rx) = oneshot::channel();
        let mut pending = self.pending.lock().await;
        pending.insert(
            correlation_id,
            PendingRequest {
                document: Arc::downgrade(document),
                waiter: Some(tx),
                submitted_at: Instant::now(),
            },
        );
        rx
    }

    /// Stop waiting for a result. Returns whether it was outstanding.
    pub async fn forget(&self, correlation_id: &CorrelationId) -> bool {
        self.pending.lock().await.remove(correlation_id).is_some()
    }

    /// Forget every outstanding request made by `document`
    pub async fn forget_document(&self, document: &DocumentId) -> usize {
        let mut pending = self.pending.lock().await;
        let before = pending.len();
        pending.retain(|_, entry| {
            entry
                .document
                .upgrade()
                .is_some_and(|doc| doc.id() != document)
        });
        before - pending.len()
    }

    /// Number of results still awaited
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Decode a worker message and dispatch it
    pub async fn on_message(&self, message: &str) -> DispatchOutcome {
        match AnalysisResult::from_message(message) {
            Ok(result) => self.on_result(result).await,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed analysis result");
                DispatchOutcome::Malformed
            }
        }
    }

    /// Apply a result to its document if that document is still waiting for it.
    ///
    /// Results that no longer match anything are dropped without error.
    pub async fn on_result(&self, result: AnalysisResult) -> DispatchOutcome {
        let entry = self.pending.lock().await.remove(&result.correlation_id);
        let correlation_id = &result.correlation_id;

        let Some(mut entry) = entry else {
            tracing::debug!(%correlation_id, "No pending request for result");
            return DispatchOutcome::Unmatched;
        };

        let Some(document) = entry.document.upgrade() else {
            tracing::debug!(%correlation_id, "Document gone before result arrived");
            return DispatchOutcome::DocumentGone;
        };

        if document.correlation_id().as_ref() != Some(correlation_id) {
            tracing::debug!(
                %correlation_id,
                document = %document.id(),
                "Document re-sampled since request, dropping result"
            );
            return DispatchOutcome::Superseded;
        }

        if document.state() != DocumentState::Displaying {
            tracing::debug!(
                %correlation_id,
                document = %document.id(),
                state = ?document.state(),
                "Document not displaying, dropping result"
            );
            return DispatchOutcome::NotDisplaying;
        }

        document.set_background(result.color.to_css());
        tracing::info!(
            %correlation_id,
            document = %document.id(),
            color = %result.color,
            latency_ms = entry.submitted_at.elapsed().as_millis() as u64,
            "Applied dominant color background"
        );

        if let Some(waiter) = entry.waiter.take() {
            // The caller may have stopped waiting; the background is applied anyway
            let _ = waiter.send(result.color);
        }

        DispatchOutcome::Applied(document.id().clone())
    }
}

impl Default for ResultDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
