//! Document access abstraction shared by the graph, resolver, and index.

use oas_ir::Document;
use oas_uri::uri_key;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Read access to the workspace's loaded documents.
///
/// The graph and resolver never own documents; they borrow whatever store
/// the workspace keeps, which lets a reload swap a document atomically
/// without touching derived structures beyond invalidation.
pub trait DocumentProvider {
    /// Document for a canonical URI.
    fn document(&self, uri: &str) -> Option<Arc<Document>>;

    /// All loaded URIs, in deterministic (sorted) order.
    fn document_uris(&self) -> Vec<String>;
}

/// A plain in-memory document collection, enough for batch analysis and
/// tests.
#[derive(Debug, Default, Clone)]
pub struct DocumentSet {
    docs: FxHashMap<String, Arc<Document>>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document under its canonical URI.
    pub fn insert(&mut self, doc: Document) {
        self.insert_arc(Arc::new(doc));
    }

    /// Insert an already-shared document.
    pub fn insert_arc(&mut self, doc: Arc<Document>) {
        self.docs.insert(doc.uri.clone(), doc);
    }

    pub fn remove(&mut self, uri: &str) -> Option<Arc<Document>> {
        self.docs.remove(&uri_key(uri))
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl DocumentProvider for DocumentSet {
    fn document(&self, uri: &str) -> Option<Arc<Document>> {
        self.docs.get(&uri_key(uri)).cloned()
    }

    fn document_uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = self.docs.keys().cloned().collect();
        uris.sort();
        uris
    }
}
