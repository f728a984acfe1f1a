//! Root-document resolution for fragments.

use crate::graph::RefGraph;
use crate::provider::DocumentProvider;
use oas_ir::OasVersion;
use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Finds the root OpenAPI documents that (transitively) reference a
/// fragment, and propagates their detected version to it.
///
/// A document is a root iff its own kind is root (`openapi`/`swagger` at
/// the top level). For anything else the resolver walks the reverse edge
/// set breadth-first; a visited set keyed by URI guarantees termination on
/// cyclic workspaces. Results are memoized per URI for the life of this
/// resolver, which is rebuilt with the graph.
pub struct RootResolver<'a> {
    graph: &'a RefGraph,
    docs: &'a dyn DocumentProvider,
    memo: RwLock<rustc_hash::FxHashMap<String, Vec<String>>>,
}

impl<'a> RootResolver<'a> {
    pub fn new(graph: &'a RefGraph, docs: &'a dyn DocumentProvider) -> Self {
        Self { graph, docs, memo: RwLock::new(rustc_hash::FxHashMap::default()) }
    }

    /// True when the document at `uri` is itself a root.
    pub fn is_root_document(&self, uri: &str) -> bool {
        self.docs.document(uri).is_some_and(|d| d.is_root())
    }

    /// Every root document that reaches the given node through references,
    /// sorted for determinism. A root reaches itself.
    pub fn find_roots_for(&self, uri: &str, _pointer: &str) -> Vec<String> {
        if let Some(cached) = self.memo.read().get(uri) {
            return cached.clone();
        }
        let roots = self.walk_reverse(uri);
        self.memo.write().insert(uri.to_string(), roots.clone());
        roots
    }

    /// The lexicographically first root for the node, when any exists.
    pub fn primary_root(&self, uri: &str, pointer: &str) -> Option<String> {
        self.find_roots_for(uri, pointer).into_iter().next()
    }

    /// The version a fragment inherits from its primary root. Root
    /// documents report their own declared version.
    pub fn version_for_partial(&self, uri: &str) -> Option<OasVersion> {
        if let Some(doc) = self.docs.document(uri) {
            if doc.is_root() {
                return Some(doc.version);
            }
        }
        let root = self.primary_root(uri, "#")?;
        self.docs.document(&root).map(|d| d.version)
    }

    fn walk_reverse(&self, start: &str) -> Vec<String> {
        if self.is_root_document(start) {
            return vec![start.to_string()];
        }
        let mut roots: FxHashSet<String> = FxHashSet::default();
        let mut visited: FxHashSet<String> = FxHashSet::default();
        let mut queue: VecDeque<String> = VecDeque::new();
        visited.insert(start.to_string());
        queue.push_back(start.to_string());

        while let Some(uri) = queue.pop_front() {
            for edge in self.graph.ref_edges_to(&uri) {
                let from = &edge.from.uri;
                if !visited.insert(from.clone()) {
                    continue;
                }
                if self.is_root_document(from) {
                    roots.insert(from.clone());
                } else {
                    queue.push_back(from.clone());
                }
            }
        }

        let mut sorted: Vec<String> = roots.into_iter().collect();
        sorted.sort();
        sorted
    }
}
