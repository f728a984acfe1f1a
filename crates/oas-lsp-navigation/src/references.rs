//! Find-references.

use crate::util::{location_of, value_location_of};
use oas_ir::IrNode;
use oas_position_tracking::{WireLocation, WirePosition};
use oas_references::ReferencesIndex;
use oas_uri::{resolve_ref, split_pointer};
use oas_workspace_index::Project;

/// References for the symbol at the position: operationId occurrences,
/// inbound refs of a component definition, or sibling `$ref`s of a ref
/// value.
pub fn find_references(
    project: &Project,
    references: &ReferencesIndex,
    uri: &str,
    position: WirePosition,
) -> Vec<WireLocation> {
    let Some(doc) = project.document(uri) else { return Vec::new() };
    let offset = doc.source_map.position_to_offset(position);
    let Some(node) = doc.root().and_then(|root| root.node_at_offset(offset)) else {
        return Vec::new();
    };

    if let Some(locations) = operation_id_occurrences(project, node) {
        return locations;
    }
    if let Some(locations) = component_dependents(project, references, uri, node) {
        return locations;
    }
    if let Some(locations) = ref_siblings(project, references, uri, node) {
        return locations;
    }
    Vec::new()
}

/// On an operationId declaration: every declaration of the same id.
fn operation_id_occurrences(project: &Project, node: &IrNode) -> Option<Vec<WireLocation>> {
    if node.key.as_deref() != Some("operationId") {
        return None;
    }
    let name = node.as_str()?;
    let occurrences = project.operation_ids().get_occurrences(name);
    if occurrences.is_empty() {
        return None;
    }
    Some(
        occurrences
            .iter()
            .filter_map(|occ| value_location_of(project, &occ.uri, &occ.pointer))
            .collect(),
    )
}

/// On a component definition: everything that references it.
fn component_dependents(
    project: &Project,
    references: &ReferencesIndex,
    uri: &str,
    node: &IrNode,
) -> Option<Vec<WireLocation>> {
    let segments = split_pointer(&node.ptr);
    if segments.len() != 3 || segments[0] != "components" {
        return None;
    }
    let inbound = references.inbound_refs_to_pointer(project.docs(), uri, &node.ptr, false);
    Some(
        inbound
            .locations
            .iter()
            .filter_map(|r| location_of(project, &r.uri, &r.pointer))
            .collect(),
    )
}

/// On a `$ref` value: every ref that resolves to the same target.
fn ref_siblings(
    project: &Project,
    references: &ReferencesIndex,
    uri: &str,
    node: &IrNode,
) -> Option<Vec<WireLocation>> {
    let ref_string = if node.key.as_deref() == Some("$ref") {
        node.as_str()?
    } else {
        node.ref_string()?
    };
    let target = resolve_ref(uri, ref_string);
    let inbound =
        references.inbound_refs_to_pointer(project.docs(), &target.uri, &target.pointer, false);
    Some(
        inbound
            .locations
            .iter()
            .filter_map(|r| location_of(project, &r.uri, &r.pointer))
            .collect(),
    )
}
