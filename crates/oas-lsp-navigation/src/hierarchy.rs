//! Reference call hierarchy.

use crate::util::location_of;
use oas_graph::GraphNode;
use oas_position_tracking::WireLocation;
use oas_workspace_index::Project;

/// One hierarchy edge endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyItem {
    pub uri: String,
    pub pointer: String,
    pub ref_string: String,
    pub location: Option<WireLocation>,
}

/// Incoming (who references this node) and outgoing (what this node's
/// subtree references) edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallHierarchy {
    pub incoming: Vec<HierarchyItem>,
    pub outgoing: Vec<HierarchyItem>,
}

/// Hierarchy for the element at `uri#pointer`. Outgoing edges cover the
/// whole subtree below the pointer; external edges are skipped.
pub fn call_hierarchy(project: &Project, uri: &str, pointer: &str) -> CallHierarchy {
    let graph = project.graph();
    let node = GraphNode::new(uri, pointer);

    let incoming = graph
        .dependent_edges(&node)
        .into_iter()
        .map(|edge| HierarchyItem {
            uri: edge.from.uri.clone(),
            pointer: edge.from.pointer.clone(),
            ref_string: edge.ref_string.clone(),
            location: location_of(project, &edge.from.uri, &edge.from.pointer),
        })
        .collect();

    let prefix = if pointer == "#" { String::from("#") } else { format!("{pointer}/") };
    let outgoing = graph
        .ref_edges_from(uri, None)
        .into_iter()
        .filter(|edge| !edge.is_external)
        .filter(|edge| edge.from.pointer == pointer || edge.from.pointer.starts_with(&prefix))
        .map(|edge| HierarchyItem {
            uri: edge.to.uri.clone(),
            pointer: edge.to.pointer.clone(),
            ref_string: edge.ref_string.clone(),
            location: location_of(project, &edge.to.uri, &edge.to.pointer),
        })
        .collect();

    CallHierarchy { incoming, outgoing }
}
