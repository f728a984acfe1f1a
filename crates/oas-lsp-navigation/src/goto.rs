//! Go-to-definition.

use crate::util::location_of;
use oas_ir::IrNode;
use oas_position_tracking::{WireLocation, WirePosition};
use oas_uri::split_pointer;
use oas_workspace_index::Project;

/// Resolve the definition(s) for the position. Handles `$ref` values,
/// operationId references (links), security-scheme names, tag names, and
/// discriminator mappings.
pub fn goto_definition(
    project: &Project,
    uri: &str,
    position: WirePosition,
) -> Vec<WireLocation> {
    let Some(doc) = project.document(uri) else { return Vec::new() };
    let offset = doc.source_map.position_to_offset(position);
    let Some(node) = doc.root().and_then(|root| root.node_at_offset(offset)) else {
        return Vec::new();
    };

    if let Some(target) = ref_target(project, uri, node) {
        return target.into_iter().collect();
    }
    if let Some(target) = link_operation_id(project, node) {
        return vec![target];
    }
    if let Some(target) = security_scheme(project, uri, node) {
        return vec![target];
    }
    if let Some(target) = tag_name(project, uri, node) {
        return vec![target];
    }
    if let Some(target) = discriminator_mapping(project, uri, node) {
        return vec![target];
    }
    Vec::new()
}

/// `$ref` string value, or the object holding one.
fn ref_target(project: &Project, uri: &str, node: &IrNode) -> Option<Option<WireLocation>> {
    let ref_string = if node.key.as_deref() == Some("$ref") {
        node.as_str()?
    } else {
        node.ref_string()?
    };
    let resolved = project.resolver().deref(uri, ref_string).ok();
    Some(resolved.and_then(|r| location_of(project, &r.origin.uri, &r.origin.pointer)))
}

/// `operationId` inside a link object references an operation.
fn link_operation_id(project: &Project, node: &IrNode) -> Option<WireLocation> {
    if node.key.as_deref() != Some("operationId") {
        return None;
    }
    let segments = split_pointer(&node.ptr);
    // A declaration lives directly under an operation; a reference lives
    // under `links`.
    if !segments.iter().any(|s| s == "links") {
        return None;
    }
    let name = node.as_str()?;
    let op = project
        .index()
        .operations
        .iter()
        .find(|op| op.operation_id.as_deref() == Some(name))?;
    location_of(project, &op.element.uri, &op.element.pointer)
}

/// A scheme name inside a `security` requirement points at the scheme
/// definition in the owning root's components.
fn security_scheme(project: &Project, uri: &str, node: &IrNode) -> Option<WireLocation> {
    let scope = project.scope_provider(uri, &node.ptr)?;
    scope.security_index?;
    let name = node.key.as_deref()?;
    let root_uri = if project.document(uri)?.is_root() {
        uri.to_string()
    } else {
        project.root_resolver().primary_root(uri, &node.ptr)?
    };
    let pointer = format!("#/components/securitySchemes/{name}");
    location_of(project, &root_uri, &pointer)
}

/// A string inside an operation's `tags` array points at the root-level
/// tag declaration.
fn tag_name(project: &Project, uri: &str, node: &IrNode) -> Option<WireLocation> {
    let segments = split_pointer(&node.ptr);
    let tags_at = segments.iter().rposition(|s| s == "tags")?;
    // `tags/<index>` under an operation; the root-level `tags` list itself
    // is the declaration site.
    if tags_at + 1 != segments.len() - 1 || segments.len() < 3 {
        return None;
    }
    let name = node.as_str()?;
    let tag = project
        .index()
        .tags
        .iter()
        .find(|t| t.name.as_deref() == Some(name))?;
    location_of(project, &tag.element.uri, &tag.element.pointer)
}

/// Discriminator mapping values are either refs or schema names.
fn discriminator_mapping(project: &Project, uri: &str, node: &IrNode) -> Option<WireLocation> {
    let segments = split_pointer(&node.ptr);
    let n = segments.len();
    if n < 3 || segments[n - 3] != "discriminator" || segments[n - 2] != "mapping" {
        return None;
    }
    let value = node.as_str()?;
    if value.contains('/') || value.contains('#') {
        let resolved = project.resolver().deref(uri, value).ok()?;
        return location_of(project, &resolved.origin.uri, &resolved.origin.pointer);
    }
    let pointer = format!("#/components/schemas/{value}");
    location_of(project, uri, &pointer)
}
