//! Code lens: reference counts on schemas, response codes and security on
//! operations.

use oas_graph::GraphNode;
use oas_position_tracking::WireRange;
use oas_workspace_index::Project;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeLens {
    pub range: WireRange,
    pub title: String,
}

/// Lenses for one document.
pub fn code_lenses(project: &Project, uri: &str) -> Vec<CodeLens> {
    let mut out = Vec::new();
    let Some(doc) = project.document(uri) else { return out };

    for component in &project.index().components {
        if component.section != "schemas" || component.element.uri != uri {
            continue;
        }
        let node = GraphNode::new(uri, component.element.pointer.clone());
        let count = project.graph().dependents_of(&node).len();
        let Some(schema_node) = doc.node_at(&component.element.pointer) else { continue };
        let span = schema_node.loc.key_span().unwrap_or_else(|| schema_node.loc.span());
        let title = match count {
            1 => "1 reference".to_string(),
            n => format!("{n} references"),
        };
        out.push(CodeLens { range: doc.source_map.span_to_range(span), title });
    }

    for op in &project.index().operations {
        if op.element.reference_uri != uri {
            continue;
        }
        let Some(op_node) = doc.node_at(&op.element.reference_pointer) else { continue };
        let span = op_node.loc.key_span().unwrap_or_else(|| op_node.loc.span());
        let range = doc.source_map.span_to_range(span);

        let codes: Vec<&str> = project
            .index()
            .responses
            .iter()
            .filter(|r| {
                r.element
                    .reference_pointer
                    .strip_prefix(op.element.pointer.as_str())
                    .is_some_and(|rest| rest.starts_with("/responses/"))
                    && r.element.reference_uri == op.element.uri
            })
            .filter_map(|r| r.status.as_deref())
            .collect();
        if !codes.is_empty() {
            out.push(CodeLens { range, title: format!("responses: {}", codes.join(", ")) });
        }

        let schemes: Vec<String> = project
            .index()
            .security
            .iter()
            .filter(|s| {
                s.element.pointer.starts_with(&format!("{}/security/", op.element.pointer))
                    && s.element.uri == op.element.uri
            })
            .flat_map(|s| s.schemes.iter().cloned())
            .collect();
        if !schemes.is_empty() {
            out.push(CodeLens { range, title: format!("security: {}", schemes.join(", ")) });
        }
    }
    out
}
