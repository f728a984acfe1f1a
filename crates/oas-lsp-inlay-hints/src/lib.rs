//! Inlay hints for OpenAPI documents.

use oas_ir::IrNode;
use oas_position_tracking::WirePosition;
use oas_workspace_index::Project;
use serde::Serialize;

/// What a hint annotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InlayHintKind {
    /// Resolved kind of a `$ref` target.
    RefTarget,
    /// Marker on a required property.
    Required,
}

/// One hint, rendered after `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlayHint {
    pub position: WirePosition,
    pub label: String,
    pub kind: InlayHintKind,
}

/// Hints for one document: `$ref` targets get their resolved `type` or
/// composition kind, required properties get a `*` marker.
pub fn inlay_hints(project: &Project, uri: &str) -> Vec<InlayHint> {
    let mut out = Vec::new();
    let Some(doc) = project.document(uri) else { return out };

    for reference in &project.index().refs {
        if reference.element.uri != uri {
            continue;
        }
        let Ok(resolved) = project.resolver().follow(uri, &reference.ref_string) else {
            continue;
        };
        let Some(label) = resolved.node().map(describe_schema) else { continue };
        let Some(node) = doc.node_at(&reference.element.pointer) else { continue };
        let Some(ref_child) = node.child("$ref") else { continue };
        let Some(span) = ref_child.loc.value_span() else { continue };
        out.push(InlayHint {
            position: doc.source_map.offset_to_position(span.end),
            label,
            kind: InlayHintKind::RefTarget,
        });
    }

    for schema in &project.index().schemas {
        if schema.element.uri != uri || !schema.required {
            continue;
        }
        let Some(node) = doc.node_at(&schema.element.pointer) else { continue };
        let Some(span) = node.loc.key_span() else { continue };
        out.push(InlayHint {
            position: doc.source_map.offset_to_position(span.end),
            label: "*".to_string(),
            kind: InlayHintKind::Required,
        });
    }

    out.sort_by_key(|h| (h.position.line, h.position.character));
    out
}

/// Human-readable kind of a schema node: explicit `type`, composition
/// keyword, or the IR kind as a fallback.
fn describe_schema(node: &IrNode) -> String {
    if let Some(ty) = node.child_str("type") {
        return ty.to_string();
    }
    for comp in ["allOf", "oneOf", "anyOf", "not"] {
        if node.child(comp).is_some() {
            return comp.to_string();
        }
    }
    if node.child("properties").is_some() {
        return "object".to_string();
    }
    node.kind.name().to_string()
}
