//! Graph behavior across document changes.

use oas_graph::{
    DocumentProvider, DocumentSet, GraphNode, RefGraph, Resolver, RootResolver, UnresolvedRefError,
};
use oas_parser::load_document;
use oas_tdd_support::{must, must_err};

fn docs(files: &[(&str, &str)]) -> DocumentSet {
    let mut set = DocumentSet::new();
    for (uri, text) in files {
        set.insert(load_document(uri, text));
    }
    set
}

#[test]
fn test_edge_per_ref_across_three_files() {
    let set = docs(&[
        (
            "file:///spec/api.yaml",
            concat!(
                "openapi: 3.1.0\n",
                "paths:\n",
                "  /a:\n",
                "    $ref: './items/a.yaml'\n",
                "components:\n",
                "  schemas:\n",
                "    Shared:\n",
                "      $ref: './common.yaml#/Shared'\n",
            ),
        ),
        (
            "file:///spec/items/a.yaml",
            "get:\n  responses:\n    '200':\n      content:\n        application/json:\n          schema:\n            $ref: '../common.yaml#/Shared'\n",
        ),
        ("file:///spec/common.yaml", "Shared:\n  type: object\n"),
    ]);
    let graph = RefGraph::build(&set);
    assert_eq!(graph.edge_count(), 3);

    let shared = GraphNode::new("file:///spec/common.yaml", "#/Shared");
    let dependents = graph.dependents_of(&shared);
    assert_eq!(dependents.len(), 2);
    // Relative traversal from a nested directory resolved correctly.
    assert!(dependents.iter().any(|n| n.uri == "file:///spec/items/a.yaml"));
}

#[test]
fn test_cycle_cache_invalidation_on_document_replacement() {
    let a_cyclic = "components:\n  schemas:\n    A:\n      $ref: './b.yaml#/components/schemas/B'\n";
    let b_cyclic = "components:\n  schemas:\n    B:\n      $ref: './a.yaml#/components/schemas/A'\n";
    let b_acyclic = "components:\n  schemas:\n    B:\n      type: object\n";

    let mut set = docs(&[("file:///a.yaml", a_cyclic), ("file:///b.yaml", b_cyclic)]);
    let mut graph = RefGraph::build(&set);
    let a_node = GraphNode::new("file:///a.yaml", "#/components/schemas/A");
    assert!(graph.has_cycle(&a_node));

    // Replace b.yaml with a non-cyclic version.
    set.insert(load_document("file:///b.yaml", b_acyclic));
    graph.remove_edges_for_uri("file:///b.yaml");
    if let Some(doc) = set.document("file:///b.yaml") {
        graph.add_document(&doc);
    }
    assert!(!graph.has_cycle(&a_node));
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_resolver_follow_across_files() {
    let set = docs(&[
        (
            "file:///spec/a.yaml",
            "components:\n  schemas:\n    Alias:\n      $ref: './b.yaml#/Inner'\n",
        ),
        ("file:///spec/b.yaml", "Inner:\n  $ref: '#/Target'\nTarget:\n  type: integer\n"),
    ]);
    let resolver = Resolver::new(&set);
    let resolved = must(resolver.follow("file:///spec/a.yaml", "#/components/schemas/Alias"));
    assert_eq!(resolved.origin.uri, "file:///spec/b.yaml");
    assert_eq!(resolved.origin.pointer, "#/Target");
}

#[test]
fn test_unresolved_after_document_removal() {
    let mut set = docs(&[
        ("file:///a.yaml", "x:\n  $ref: './b.yaml#/y'\n"),
        ("file:///b.yaml", "y: 1\n"),
    ]);
    let resolver = Resolver::new(&set);
    assert!(resolver.deref("file:///a.yaml", "./b.yaml#/y").is_ok());

    set.remove("file:///b.yaml");
    let resolver = Resolver::new(&set);
    let err = must_err(resolver.deref("file:///a.yaml", "./b.yaml#/y"));
    assert!(matches!(err, UnresolvedRefError::DocumentNotLoaded { .. }));
}

#[test]
fn test_root_resolution_through_deep_chain() {
    let set = docs(&[
        ("file:///spec/api.yaml", "openapi: 3.2.0\npaths:\n  /x:\n    $ref: './l1.yaml'\n"),
        (
            "file:///spec/l1.yaml",
            "get:\n  responses:\n    '200':\n      content:\n        application/json:\n          schema:\n            $ref: './l2.yaml'\n",
        ),
        ("file:///spec/l2.yaml", "type: object\nproperties:\n  next:\n    $ref: './l3.yaml'\n"),
        ("file:///spec/l3.yaml", "type: string\n"),
    ]);
    let graph = RefGraph::build(&set);
    let roots = RootResolver::new(&graph, &set);
    for fragment in ["file:///spec/l1.yaml", "file:///spec/l2.yaml", "file:///spec/l3.yaml"] {
        assert_eq!(roots.find_roots_for(fragment, "#"), vec!["file:///spec/api.yaml"]);
        assert_eq!(roots.version_for_partial(fragment).map(|v| v.as_str()), Some("3.2"));
    }
}
