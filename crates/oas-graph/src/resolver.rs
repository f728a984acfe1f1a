//! `$ref` dereferencing with typed failures and origin tracking.

use crate::graph::GraphNode;
use crate::provider::DocumentProvider;
use oas_ir::{Document, IrNode};
use oas_uri::resolve_ref;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use thiserror::Error;

/// Hop limit for `$ref` chains; past this the chain is reported rather
/// than followed.
pub const MAX_REF_CHAIN: usize = 64;

/// Why a `$ref` could not be dereferenced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UnresolvedRefError {
    #[error("document not loaded: {uri} (referenced as {ref_string})")]
    DocumentNotLoaded { uri: String, ref_string: String },
    #[error("pointer {pointer} not found in {uri} (referenced as {ref_string})")]
    PointerNotFound { uri: String, pointer: String, ref_string: String },
    #[error("$ref chain exceeds {max} hops starting from {ref_string}")]
    ChainTooDeep { ref_string: String, max: usize },
}

/// A successful dereference: the target document plus the origin node
/// naming where the value is defined.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub document: Arc<Document>,
    pub origin: GraphNode,
}

impl Resolved {
    /// The resolved IR node. Present unless the owning document was
    /// replaced after resolution.
    pub fn node(&self) -> Option<&IrNode> {
        self.document.node_at(&self.origin.pointer)
    }

    /// Definition location of the resolved value.
    pub fn origin_of(&self) -> &GraphNode {
        &self.origin
    }
}

/// Dereferences `$ref` strings against the workspace's documents.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    docs: &'a dyn DocumentProvider,
}

impl<'a> Resolver<'a> {
    pub fn new(docs: &'a dyn DocumentProvider) -> Self {
        Self { docs }
    }

    /// Resolve one `$ref` step. Never returns an empty value: failure is
    /// always a typed error.
    pub fn deref(&self, from_uri: &str, ref_string: &str) -> Result<Resolved, UnresolvedRefError> {
        let target = resolve_ref(from_uri, ref_string);
        let document = self.docs.document(&target.uri).ok_or_else(|| {
            UnresolvedRefError::DocumentNotLoaded {
                uri: target.uri.clone(),
                ref_string: ref_string.to_string(),
            }
        })?;
        if document.node_at(&target.pointer).is_none() {
            return Err(UnresolvedRefError::PointerNotFound {
                uri: target.uri,
                pointer: target.pointer,
                ref_string: ref_string.to_string(),
            });
        }
        Ok(Resolved { document, origin: GraphNode::new(target.uri, target.pointer) })
    }

    /// Follow a `$ref` chain to its final non-ref value. Cycles terminate
    /// at the first revisited node; chains longer than [`MAX_REF_CHAIN`]
    /// fail with `ChainTooDeep`.
    pub fn follow(&self, from_uri: &str, ref_string: &str) -> Result<Resolved, UnresolvedRefError> {
        let mut visited: FxHashSet<String> = FxHashSet::default();
        let mut current = self.deref(from_uri, ref_string)?;
        visited.insert(current.origin.key());
        for _ in 0..MAX_REF_CHAIN {
            let next_ref = match current.node().and_then(|n| n.ref_string()) {
                Some(r) => r.to_string(),
                None => return Ok(current),
            };
            let next = self.deref(&current.origin.uri, &next_ref)?;
            if !visited.insert(next.origin.key()) {
                return Ok(next);
            }
            current = next;
        }
        Err(UnresolvedRefError::ChainTooDeep { ref_string: ref_string.to_string(), max: MAX_REF_CHAIN })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::DocumentSet;
    use oas_parser::load_document;
    use oas_tdd_support::{must, must_err, must_some};

    fn docs(files: &[(&str, &str)]) -> DocumentSet {
        let mut set = DocumentSet::new();
        for (uri, text) in files {
            set.insert(load_document(uri, text));
        }
        set
    }

    #[test]
    fn test_deref_same_document() {
        let set = docs(&[(
            "file:///a.yaml",
            "components:\n  schemas:\n    User:\n      type: object\n",
        )]);
        let resolver = Resolver::new(&set);
        let resolved = must(resolver.deref("file:///a.yaml", "#/components/schemas/User"));
        assert_eq!(resolved.origin.key(), "file:///a.yaml#/components/schemas/User");
        let node = must_some(resolved.node());
        assert_eq!(node.child_str("type"), Some("object"));
    }

    #[test]
    fn test_deref_cross_file_tracks_origin() {
        let set = docs(&[
            (
                "file:///spec/a.yaml",
                "components:\n  schemas:\n    A:\n      $ref: './b.yaml#/components/schemas/B'\n",
            ),
            ("file:///spec/b.yaml", "components:\n  schemas:\n    B:\n      type: string\n"),
        ]);
        let resolver = Resolver::new(&set);
        let resolved = must(resolver.deref("file:///spec/a.yaml", "./b.yaml#/components/schemas/B"));
        assert_eq!(resolved.origin_of().uri, "file:///spec/b.yaml");
        assert_eq!(resolved.origin_of().pointer, "#/components/schemas/B");
    }

    #[test]
    fn test_deref_document_not_loaded() {
        let set = docs(&[("file:///a.yaml", "x: 1\n")]);
        let resolver = Resolver::new(&set);
        let err = must_err(resolver.deref("file:///a.yaml", "./missing.yaml#/X"));
        assert!(matches!(err, UnresolvedRefError::DocumentNotLoaded { .. }));
    }

    #[test]
    fn test_deref_pointer_not_found() {
        let set = docs(&[("file:///a.yaml", "components:\n  schemas: {}\n")]);
        let resolver = Resolver::new(&set);
        let err = must_err(resolver.deref("file:///a.yaml", "#/components/schemas/Nope"));
        assert!(matches!(err, UnresolvedRefError::PointerNotFound { .. }));
    }

    #[test]
    fn test_follow_chain() {
        let set = docs(&[(
            "file:///a.yaml",
            concat!(
                "components:\n",
                "  schemas:\n",
                "    A:\n",
                "      $ref: '#/components/schemas/B'\n",
                "    B:\n",
                "      $ref: '#/components/schemas/C'\n",
                "    C:\n",
                "      type: integer\n",
            ),
        )]);
        let resolver = Resolver::new(&set);
        let resolved = must(resolver.follow("file:///a.yaml", "#/components/schemas/A"));
        assert_eq!(resolved.origin.pointer, "#/components/schemas/C");
    }

    #[test]
    fn test_follow_terminates_on_cycle() {
        let set = docs(&[(
            "file:///a.yaml",
            concat!(
                "components:\n",
                "  schemas:\n",
                "    A:\n",
                "      $ref: '#/components/schemas/B'\n",
                "    B:\n",
                "      $ref: '#/components/schemas/A'\n",
            ),
        )]);
        let resolver = Resolver::new(&set);
        // Cycle: follow stops at the first revisit rather than spinning.
        assert!(resolver.follow("file:///a.yaml", "#/components/schemas/A").is_ok());
    }
}
