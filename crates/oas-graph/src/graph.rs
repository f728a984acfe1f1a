//! The pointer-granular reference graph.

use crate::provider::DocumentProvider;
use oas_ir::{Document, IrNode};
use oas_uri::{node_key, resolve_ref};
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tracing::debug;

/// A `uri#pointer` endpoint in the reference graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphNode {
    pub uri: String,
    pub pointer: String,
}

impl GraphNode {
    pub fn new(uri: impl Into<String>, pointer: impl Into<String>) -> Self {
        Self { uri: uri.into(), pointer: pointer.into() }
    }

    /// Concatenated `uri#pointer` identity key.
    pub fn key(&self) -> String {
        node_key(&self.uri, &self.pointer)
    }
}

/// One `$ref` occurrence: the node containing the ref, the resolved target,
/// and the raw ref string. `http(s)` targets are flagged external and
/// excluded from local traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct RefEdge {
    pub from: GraphNode,
    pub to: GraphNode,
    pub ref_string: String,
    pub is_external: bool,
}

/// Forward and reverse `$ref` edges over the whole workspace.
///
/// Edges are stored in one arena with tombstones; four indices (by from/to
/// URI and by from/to node key) keep per-URI removal and pointer-level
/// queries cheap. Cycle results are cached and dropped on any mutation.
#[derive(Debug, Default)]
pub struct RefGraph {
    edges: Vec<Option<RefEdge>>,
    by_from_uri: FxHashMap<String, Vec<usize>>,
    by_to_uri: FxHashMap<String, Vec<usize>>,
    by_from_node: FxHashMap<String, Vec<usize>>,
    by_to_node: FxHashMap<String, Vec<usize>>,
    cycle_cache: RwLock<Option<Arc<FxHashSet<String>>>>,
}

impl RefGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph over every document the provider knows.
    pub fn build(provider: &dyn DocumentProvider) -> Self {
        let mut graph = Self::new();
        for uri in provider.document_uris() {
            if let Some(doc) = provider.document(&uri) {
                graph.add_document(&doc);
            }
        }
        debug!(edges = graph.edge_count(), "reference graph built");
        graph
    }

    /// Collect every `$ref` in `doc` into edges. A node carrying `$ref` is
    /// a boundary: collection records the edge and does not descend, which
    /// keeps construction terminating on cyclic references.
    pub fn add_document(&mut self, doc: &Document) {
        if let Some(root) = doc.root() {
            self.collect(root, &doc.uri);
        }
        self.invalidate_cycle_cache();
    }

    fn collect(&mut self, node: &IrNode, uri: &str) {
        if let Some(ref_string) = node.ref_string() {
            let target = resolve_ref(uri, ref_string);
            self.push_edge(RefEdge {
                from: GraphNode::new(uri, node.ptr.clone()),
                to: GraphNode::new(target.uri, target.pointer),
                ref_string: ref_string.to_string(),
                is_external: target.external,
            });
            return;
        }
        for child in &node.children {
            self.collect(child, uri);
        }
    }

    fn push_edge(&mut self, edge: RefEdge) {
        let idx = self.edges.len();
        self.by_from_uri.entry(edge.from.uri.clone()).or_default().push(idx);
        self.by_to_uri.entry(edge.to.uri.clone()).or_default().push(idx);
        self.by_from_node.entry(edge.from.key()).or_default().push(idx);
        self.by_to_node.entry(edge.to.key()).or_default().push(idx);
        self.edges.push(Some(edge));
    }

    /// Drop every edge originating in `uri`. Called before re-adding a
    /// changed document.
    pub fn remove_edges_for_uri(&mut self, uri: &str) {
        let Some(indices) = self.by_from_uri.remove(uri) else { return };
        for idx in indices {
            let Some(edge) = self.edges[idx].take() else { continue };
            if let Some(v) = self.by_to_uri.get_mut(&edge.to.uri) {
                v.retain(|i| *i != idx);
            }
            if let Some(v) = self.by_from_node.get_mut(&edge.from.key()) {
                v.retain(|i| *i != idx);
            }
            if let Some(v) = self.by_to_node.get_mut(&edge.to.key()) {
                v.retain(|i| *i != idx);
            }
        }
        self.invalidate_cycle_cache();
    }

    /// Live edges, construction order.
    pub fn edges(&self) -> impl Iterator<Item = &RefEdge> {
        self.edges.iter().filter_map(|e| e.as_ref())
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Outgoing edges of one node.
    pub fn references_from(&self, node: &GraphNode) -> Vec<&RefEdge> {
        self.indexed(&self.by_from_node, &node.key())
    }

    /// Incoming edges of one node (pointer-exact).
    pub fn dependent_edges(&self, node: &GraphNode) -> Vec<&RefEdge> {
        self.indexed(&self.by_to_node, &node.key())
    }

    /// Nodes that reference `node` directly.
    pub fn dependents_of(&self, node: &GraphNode) -> Vec<GraphNode> {
        self.dependent_edges(node).into_iter().map(|e| e.from.clone()).collect()
    }

    /// Outgoing edges of a whole document, optionally narrowed to one
    /// pointer.
    pub fn ref_edges_from(&self, uri: &str, pointer: Option<&str>) -> Vec<&RefEdge> {
        match pointer {
            Some(ptr) => self.indexed(&self.by_from_node, &node_key(uri, ptr)),
            None => self.indexed(&self.by_from_uri, uri),
        }
    }

    /// Incoming edges of a whole document.
    pub fn ref_edges_to(&self, uri: &str) -> Vec<&RefEdge> {
        self.indexed(&self.by_to_uri, uri)
    }

    fn indexed(&self, index: &FxHashMap<String, Vec<usize>>, key: &str) -> Vec<&RefEdge> {
        index
            .get(key)
            .map(|indices| indices.iter().filter_map(|i| self.edges[*i].as_ref()).collect())
            .unwrap_or_default()
    }

    /// True when `edge` leaves the local workspace.
    pub fn is_external_ref(edge: &RefEdge) -> bool {
        edge.is_external
    }

    /// True when `node` lies on a reference cycle: its strongly-connected
    /// component has size > 1, or it carries a self-loop.
    pub fn has_cycle(&self, node: &GraphNode) -> bool {
        self.cycle_keys().contains(&node.key())
    }

    /// Node keys of every cycle participant.
    pub fn cycle_keys(&self) -> Arc<FxHashSet<String>> {
        if let Some(cached) = self.cycle_cache.read().as_ref() {
            return Arc::clone(cached);
        }
        let computed = Arc::new(self.compute_cycle_keys());
        *self.cycle_cache.write() = Some(Arc::clone(&computed));
        computed
    }

    fn invalidate_cycle_cache(&mut self) {
        *self.cycle_cache.write() = None;
    }

    /// Iterative Tarjan SCC over the local (non-external) edge set; an
    /// explicit stack keeps deep ref chains from exhausting the call stack.
    fn compute_cycle_keys(&self) -> FxHashSet<String> {
        let mut ids: FxHashMap<String, usize> = FxHashMap::default();
        let mut names: Vec<String> = Vec::new();
        let mut intern = |key: String, names: &mut Vec<String>, ids: &mut FxHashMap<String, usize>| {
            if let Some(&id) = ids.get(&key) {
                return id;
            }
            let id = names.len();
            ids.insert(key.clone(), id);
            names.push(key);
            id
        };

        let mut adj: Vec<Vec<usize>> = Vec::new();
        let mut self_loops: FxHashSet<usize> = FxHashSet::default();
        for edge in self.edges().filter(|e| !e.is_external) {
            let from = intern(edge.from.key(), &mut names, &mut ids);
            let to = intern(edge.to.key(), &mut names, &mut ids);
            if adj.len() < names.len() {
                adj.resize(names.len(), Vec::new());
            }
            if from == to {
                self_loops.insert(from);
            }
            adj[from].push(to);
        }
        if adj.len() < names.len() {
            adj.resize(names.len(), Vec::new());
        }

        let n = names.len();
        const UNVISITED: usize = usize::MAX;
        let mut index = vec![UNVISITED; n];
        let mut low = vec![0usize; n];
        let mut on_stack = vec![false; n];
        let mut stack: Vec<usize> = Vec::new();
        let mut next_index = 0usize;
        let mut cyclic: FxHashSet<String> = FxHashSet::default();

        for start in 0..n {
            if index[start] != UNVISITED {
                continue;
            }
            let mut call: Vec<(usize, usize)> = vec![(start, 0)];
            index[start] = next_index;
            low[start] = next_index;
            next_index += 1;
            stack.push(start);
            on_stack[start] = true;

            while let Some(frame) = call.last_mut() {
                let v = frame.0;
                if frame.1 < adj[v].len() {
                    let w = adj[v][frame.1];
                    frame.1 += 1;
                    if index[w] == UNVISITED {
                        index[w] = next_index;
                        low[w] = next_index;
                        next_index += 1;
                        stack.push(w);
                        on_stack[w] = true;
                        call.push((w, 0));
                    } else if on_stack[w] {
                        low[v] = low[v].min(index[w]);
                    }
                } else {
                    call.pop();
                    if let Some(parent) = call.last() {
                        low[parent.0] = low[parent.0].min(low[v]);
                    }
                    if low[v] == index[v] {
                        let mut component = Vec::new();
                        while let Some(w) = stack.pop() {
                            on_stack[w] = false;
                            component.push(w);
                            if w == v {
                                break;
                            }
                        }
                        if component.len() > 1 {
                            for w in component {
                                cyclic.insert(names[w].clone());
                            }
                        }
                    }
                }
            }
        }

        for v in self_loops {
            cyclic.insert(names[v].clone());
        }
        cyclic
    }
}
