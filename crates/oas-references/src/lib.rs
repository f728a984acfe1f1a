//! Inbound-reference search over the workspace.
//!
//! Answers "who references this?" at file and pointer granularity by
//! walking every known document's `$ref` nodes and resolving them against
//! their source URI. Results partition into internal (source is the
//! target document itself) and external (any other document) and group by
//! source file. Lookups are cached; any document change invalidates the
//! whole cache.

use oas_graph::DocumentProvider;
use oas_ir::IrNode;
use oas_uri::resolve_ref;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

/// One `$ref` that resolves to the queried target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRef {
    /// Document containing the reference.
    pub uri: String,
    /// Pointer of the node carrying `$ref`.
    pub pointer: String,
    /// The raw `$ref` string.
    pub ref_string: String,
}

/// The full answer for one target.
#[derive(Debug, Clone, Default)]
pub struct InboundRefs {
    /// Every matching reference, in document/source order.
    pub locations: Vec<InboundRef>,
    /// Matching references grouped by source document.
    pub by_file: FxHashMap<String, Vec<InboundRef>>,
    /// References from the target document itself.
    pub internal: Vec<InboundRef>,
    /// References from other documents.
    pub external: Vec<InboundRef>,
}

impl InboundRefs {
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }
}

/// Cached inbound-reference lookups.
#[derive(Debug, Default)]
pub struct ReferencesIndex {
    cache: RwLock<FxHashMap<String, Arc<InboundRefs>>>,
}

impl ReferencesIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// References resolving to exactly `target_uri#pointer`. With
    /// `exclude_self`, references originating in the target document are
    /// dropped.
    pub fn inbound_refs_to_pointer(
        &self,
        provider: &dyn DocumentProvider,
        target_uri: &str,
        pointer: &str,
        exclude_self: bool,
    ) -> Arc<InboundRefs> {
        self.cached(provider, target_uri, Some(pointer), exclude_self)
    }

    /// References resolving to any pointer inside `target_uri`.
    pub fn inbound_refs(
        &self,
        provider: &dyn DocumentProvider,
        target_uri: &str,
    ) -> Arc<InboundRefs> {
        self.cached(provider, target_uri, None, false)
    }

    /// Drop every cached result. Called on any document change; the cache
    /// carries no per-URI bookkeeping by design.
    pub fn invalidate(&self) {
        self.cache.write().clear();
    }

    fn cached(
        &self,
        provider: &dyn DocumentProvider,
        target_uri: &str,
        pointer: Option<&str>,
        exclude_self: bool,
    ) -> Arc<InboundRefs> {
        let key = format!("{target_uri}{}?{exclude_self}", pointer.unwrap_or("*"));
        if let Some(hit) = self.cache.read().get(&key) {
            return Arc::clone(hit);
        }
        let computed = Arc::new(search(provider, target_uri, pointer, exclude_self));
        debug!(target = %key, hits = computed.len(), "inbound reference search");
        self.cache.write().insert(key, Arc::clone(&computed));
        computed
    }
}

fn search(
    provider: &dyn DocumentProvider,
    target_uri: &str,
    pointer: Option<&str>,
    exclude_self: bool,
) -> InboundRefs {
    let mut result = InboundRefs::default();
    for uri in provider.document_uris() {
        if exclude_self && uri == target_uri {
            continue;
        }
        let Some(doc) = provider.document(&uri) else { continue };
        let Some(root) = doc.root() else { continue };
        let mut refs = Vec::new();
        collect_refs(root, &mut refs);
        for (ptr, ref_string) in refs {
            let target = resolve_ref(&uri, &ref_string);
            if target.uri != target_uri {
                continue;
            }
            if let Some(wanted) = pointer {
                if target.pointer != wanted {
                    continue;
                }
            }
            let inbound = InboundRef { uri: uri.clone(), pointer: ptr, ref_string };
            result.by_file.entry(uri.clone()).or_default().push(inbound.clone());
            if uri == target_uri {
                result.internal.push(inbound.clone());
            } else {
                result.external.push(inbound.clone());
            }
            result.locations.push(inbound);
        }
    }
    result
}

/// `$ref` nodes of a subtree; never descends past one.
fn collect_refs(node: &IrNode, out: &mut Vec<(String, String)>) {
    if let Some(ref_string) = node.ref_string() {
        out.push((node.ptr.clone(), ref_string.to_string()));
        return;
    }
    for child in &node.children {
        collect_refs(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oas_graph::DocumentSet;
    use oas_parser::load_document;

    fn docs(files: &[(&str, &str)]) -> DocumentSet {
        let mut set = DocumentSet::new();
        for (uri, text) in files {
            set.insert(load_document(uri, text));
        }
        set
    }

    const A: &str = concat!(
        "openapi: 3.1.0\n",
        "paths:\n",
        "  /u:\n",
        "    get:\n",
        "      responses:\n",
        "        '200':\n",
        "          content:\n",
        "            application/json:\n",
        "              schema:\n",
        "                $ref: '#/components/schemas/User'\n",
        "components:\n",
        "  schemas:\n",
        "    User:\n",
        "      type: object\n",
    );

    const B: &str = concat!(
        "openapi: 3.1.0\n",
        "paths:\n",
        "  /v:\n",
        "    get:\n",
        "      responses:\n",
        "        '200':\n",
        "          content:\n",
        "            application/json:\n",
        "              schema:\n",
        "                $ref: './a.yaml#/components/schemas/User'\n",
    );

    #[test]
    fn test_pointer_level_search_partitions() {
        let set = docs(&[("file:///spec/a.yaml", A), ("file:///spec/b.yaml", B)]);
        let index = ReferencesIndex::new();
        let refs = index.inbound_refs_to_pointer(
            &set,
            "file:///spec/a.yaml",
            "#/components/schemas/User",
            false,
        );
        assert_eq!(refs.len(), 2);
        assert_eq!(refs.internal.len(), 1);
        assert_eq!(refs.external.len(), 1);
        assert_eq!(refs.by_file.len(), 2);
    }

    #[test]
    fn test_exclude_self_drops_internal() {
        let set = docs(&[("file:///spec/a.yaml", A), ("file:///spec/b.yaml", B)]);
        let index = ReferencesIndex::new();
        let refs = index.inbound_refs_to_pointer(
            &set,
            "file:///spec/a.yaml",
            "#/components/schemas/User",
            true,
        );
        assert_eq!(refs.len(), 1);
        assert!(refs.internal.is_empty());
    }

    #[test]
    fn test_file_level_search() {
        let set = docs(&[("file:///spec/a.yaml", A), ("file:///spec/b.yaml", B)]);
        let index = ReferencesIndex::new();
        let refs = index.inbound_refs(&set, "file:///spec/a.yaml");
        // Both the internal and the cross-file ref target a.yaml.
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn test_no_matches_for_unreferenced_pointer() {
        let set = docs(&[("file:///spec/a.yaml", A)]);
        let index = ReferencesIndex::new();
        let refs =
            index.inbound_refs_to_pointer(&set, "file:///spec/a.yaml", "#/components", false);
        assert!(refs.is_empty());
    }

    #[test]
    fn test_cache_hit_and_invalidate() {
        let set = docs(&[("file:///spec/a.yaml", A)]);
        let index = ReferencesIndex::new();
        let first = index.inbound_refs_to_pointer(
            &set,
            "file:///spec/a.yaml",
            "#/components/schemas/User",
            false,
        );
        let second = index.inbound_refs_to_pointer(
            &set,
            "file:///spec/a.yaml",
            "#/components/schemas/User",
            false,
        );
        assert!(Arc::ptr_eq(&first, &second));
        index.invalidate();
        let third = index.inbound_refs_to_pointer(
            &set,
            "file:///spec/a.yaml",
            "#/components/schemas/User",
            false,
        );
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(first.len(), third.len());
    }
}
