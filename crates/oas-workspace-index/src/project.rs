//! The analyzed project: documents plus every derived structure.

use crate::cancel::CancelToken;
use crate::operation_ids::OperationIdIndex;
use crate::records::ProjectIndex;
use crate::scope::ScopeContext;
use crate::walker::build_index;
use oas_graph::{DocumentProvider, DocumentSet, RefGraph, Resolver, RootResolver};
use oas_ir::{Document, OasVersion};
use std::sync::Arc;

/// A consistent snapshot of the workspace: the document set, the reference
/// graph, and the project index, built together. Everything here is
/// read-only after construction; a document change means building a new
/// `Project` from a fresh snapshot.
#[derive(Debug)]
pub struct Project {
    docs: DocumentSet,
    graph: RefGraph,
    index: ProjectIndex,
    operation_ids: OperationIdIndex,
}

impl Project {
    /// Build graph and index over `docs`. Checks `token` between documents
    /// and returns a partial project when cancelled.
    pub fn build(docs: DocumentSet, token: &CancelToken) -> Self {
        let graph = RefGraph::build(&docs);
        let (index, operation_ids) = build_index(&docs, &graph, token);
        Self { docs, graph, index, operation_ids }
    }

    pub fn docs(&self) -> &DocumentSet {
        &self.docs
    }

    pub fn document(&self, uri: &str) -> Option<Arc<Document>> {
        self.docs.document(uri)
    }

    pub fn document_uris(&self) -> Vec<String> {
        self.docs.document_uris()
    }

    pub fn graph(&self) -> &RefGraph {
        &self.graph
    }

    pub fn index(&self) -> &ProjectIndex {
        &self.index
    }

    pub fn operation_ids(&self) -> &OperationIdIndex {
        &self.operation_ids
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.docs)
    }

    pub fn root_resolver(&self) -> RootResolver<'_> {
        RootResolver::new(&self.graph, &self.docs)
    }

    /// A document's effective version: its own when it is a root, the
    /// primary root's otherwise.
    pub fn effective_version(&self, uri: &str) -> OasVersion {
        match self.document(uri) {
            Some(doc) if doc.is_root() => doc.version,
            Some(_) => self.root_resolver().version_for_partial(uri).unwrap_or(OasVersion::Unknown),
            None => OasVersion::Unknown,
        }
    }

    /// Scope context of a location, when the document is loaded.
    pub fn scope_provider(&self, uri: &str, pointer: &str) -> Option<ScopeContext> {
        self.document(uri)?;
        ScopeContext::from_pointer(pointer)
    }
}
