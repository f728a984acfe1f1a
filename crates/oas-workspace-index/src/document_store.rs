//! Thread-safe store of loaded documents.

use oas_graph::{DocumentProvider, DocumentSet};
use oas_ir::Document;
use oas_parser::load_document;
use oas_uri::uri_key;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// The workspace's single mutable document map.
///
/// Documents are replaced wholesale on change; derived structures (graph,
/// index, caches) are rebuilt or invalidated by the owner. Analysis runs
/// on a [`snapshot`](DocumentStore::snapshot) so concurrent updates never
/// tear a run.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Arc<RwLock<FxHashMap<String, Arc<Document>>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and store `text` as the document at `uri`, replacing any
    /// previous version.
    pub fn open(&self, uri: &str, text: &str) -> Arc<Document> {
        let doc = Arc::new(load_document(uri, text));
        self.documents.write().insert(doc.uri.clone(), Arc::clone(&doc));
        doc
    }

    /// Drop the document. Returns whether it was present.
    pub fn close(&self, uri: &str) -> bool {
        self.documents.write().remove(&uri_key(uri)).is_some()
    }

    pub fn get(&self, uri: &str) -> Option<Arc<Document>> {
        self.documents.read().get(&uri_key(uri)).cloned()
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.documents.read().contains_key(&uri_key(uri))
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().len() == 0
    }

    /// A consistent point-in-time view for analysis.
    pub fn snapshot(&self) -> DocumentSet {
        let mut set = DocumentSet::new();
        for doc in self.documents.read().values() {
            set.insert_arc(Arc::clone(doc));
        }
        set
    }
}

impl DocumentProvider for DocumentStore {
    fn document(&self, uri: &str) -> Option<Arc<Document>> {
        self.get(uri)
    }

    fn document_uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = self.documents.read().keys().cloned().collect();
        uris.sort();
        uris
    }
}
