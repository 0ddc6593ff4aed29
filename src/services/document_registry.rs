use crate::models::{DocumentId, DocumentState, ImageDocument};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Source of the image documents currently open
#[async_trait]
pub trait DocumentRegistry: Send + Sync {
    /// Add or replace a document
    async fn insert(&self, document: Arc<ImageDocument>);

    /// Remove a document, returning it if present
    async fn remove(&self, id: &DocumentId) -> Option<Arc<ImageDocument>>;

    /// Find document by ID
    async fn find_by_id(&self, id: &DocumentId) -> Option<Arc<ImageDocument>>;

    /// Snapshot of every document that has not been unloaded, oldest first
    async fn live_documents(&self) -> Vec<Arc<ImageDocument>>;
}

/// In-memory document registry
pub struct InMemoryRegistry {
    documents: Arc<RwLock<HashMap<DocumentId, Arc<ImageDocument>>>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentRegistry for InMemoryRegistry {
    async fn insert(&self, document: Arc<ImageDocument>) {
        let mut documents = self.documents.write().await;
        documents.insert(document.id().clone(), document);
    }

    async fn remove(&self, id: &DocumentId) -> Option<Arc<ImageDocument>> {
        let mut documents = self.documents.write().await;
        documents.remove(id)
    }

    async fn find_by_id(&self, id: &DocumentId) -> Option<Arc<ImageDocument>> {
        let documents = self.documents.read().await;
        documents.get(id).cloned()
    }

    async fn live_documents(&self) -> Vec<Arc<ImageDocument>> {
        let documents = self.documents.read().await;
        let mut live: Vec<Arc<ImageDocument>> = documents
            .values()
            .filter(|doc| doc.state() != DocumentState::Unloaded)
            .cloned()
            .collect();
        live.sort_by(|a, b| {
            a.opened_at()
                .cmp(&b.opened_at())
                .then_with(|| a.id().as_str().cmp(b.id().as_str()))
        });
        live
    }
}
