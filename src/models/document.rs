use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use crate::error::SampleError;
use crate::models::{CorrelationId, ImageBuffer};

/// Identifier of a live image document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Random 12-character alphanumeric id
    pub fn generate() -> Self {
        use rand::Rng;
        let id: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display state of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Bitmap still decoding
    Loading,
    /// Bitmap decoded and shown
    Displaying,
    /// Navigated away or closed
    Unloaded,
}

/// A standalone image document as seen by the background logic.
///
/// The recorded correlation id is the only state shared between the
/// sampling side and the dispatch side: it is written when a request is
/// submitted and read when results come back.
pub struct ImageDocument {
    id: DocumentId,
    state: watch::Sender<DocumentState>,
    bitmap: Mutex<Option<ImageBuffer>>,
    correlation_id: Mutex<Option<CorrelationId>>,
    background: Mutex<Option<String>>,
    opened_at: chrono::DateTime<chrono::Utc>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ImageDocument {
    /// A document whose bitmap has not finished decoding yet
    pub fn loading(id: DocumentId) -> Arc<Self> {
        let (state, _) = watch::channel(DocumentState::Loading);
        Arc::new(Self {
            id,
            state,
            bitmap: Mutex::new(None),
            correlation_id: Mutex::new(None),
            background: Mutex::new(None),
            opened_at: chrono::Utc::now(),
        })
    }

    /// A document that is already displaying `bitmap`
    pub fn loaded(id: DocumentId, bitmap: ImageBuffer) -> Arc<Self> {
        let doc = Self::loading(id);
        doc.finish_loading(bitmap);
        doc
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn opened_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.opened_at
    }

    pub fn state(&self) -> DocumentState {
        *self.state.borrow()
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == DocumentState::Displaying
    }

    /// Store the decoded bitmap and fire the load-complete signal.
    ///
    /// Has no effect on a document that was already unloaded.
    pub fn finish_loading(&self, bitmap: ImageBuffer) {
        let mut bitmap = Some(bitmap);
        // The bitmap is stored under the state lock so `unload` cannot slip in between
        self.state.send_if_modified(|state| {
            if *state != DocumentState::Loading {
                return false;
            }
            *lock(&self.bitmap) = bitmap.take();
            *state = DocumentState::Displaying;
            true
        });
    }

    /// Mark the document as navigated away / closed
    pub fn unload(&self) {
        self.state.send_replace(DocumentState::Unloaded);
        *lock(&self.bitmap) = None;
    }

    /// Suspend until the bitmap is decoded.
    pub async fn wait_until_loaded(&self) -> Result<(), SampleError> {
        let mut rx = self.state.subscribe();
        let state = *rx
            .wait_for(|state| *state != DocumentState::Loading)
            .await
            .map_err(|_| SampleError::DocumentUnloaded(self.id.to_string()))?;

        match state {
            DocumentState::Displaying => Ok(()),
            _ => Err(SampleError::DocumentUnloaded(self.id.to_string())),
        }
    }

    /// Natural (undownscaled) bitmap dimensions, once loaded
    pub fn natural_size(&self) -> Option<(u32, u32)> {
        lock(&self.bitmap)
            .as_ref()
            .map(|bitmap| (bitmap.width(), bitmap.height()))
    }

    /// Run `f` against the decoded bitmap without copying it
    pub fn with_bitmap<R>(&self, f: impl FnOnce(&ImageBuffer) -> R) -> Option<R> {
        lock(&self.bitmap).as_ref().map(f)
    }

    pub fn record_correlation_id(&self, id: CorrelationId) {
        *lock(&self.correlation_id) = Some(id);
    }

    pub fn correlation_id(&self) -> Option<CorrelationId> {
        lock(&self.correlation_id).clone()
    }

    pub fn set_background(&self, css: impl Into<String>) {
        *lock(&self.background) = Some(css.into());
    }

    /// CSS background currently applied, if any
    pub fn background(&self) -> Option<String> {
        lock(&self.background).clone()
    }
}

impl fmt::Debug for ImageDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageDocument")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("natural_size", &self.natural_size())
            .field("correlation_id", &self.correlation_id())
            .finish()
    }
}
