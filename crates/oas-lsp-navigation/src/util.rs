//! Shared node and location helpers.

use oas_position_tracking::WireLocation;
use oas_workspace_index::Project;

/// Location of the node at `uri#ptr`, preferring the key token.
pub fn location_of(project: &Project, uri: &str, ptr: &str) -> Option<WireLocation> {
    let doc = project.document(uri)?;
    let node = doc.node_at(ptr)?;
    let span = node.loc.key_span().unwrap_or_else(|| node.loc.span());
    Some(WireLocation::new(uri, doc.source_map.span_to_range(span)))
}

/// Location of the value token of the node at `uri#ptr`.
pub fn value_location_of(project: &Project, uri: &str, ptr: &str) -> Option<WireLocation> {
    let doc = project.document(uri)?;
    let node = doc.node_at(ptr)?;
    let span = node.loc.value_span().unwrap_or_else(|| node.loc.span());
    Some(WireLocation::new(uri, doc.source_map.span_to_range(span)))
}
