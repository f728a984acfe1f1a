//! Expected-shape validation for validation-group files.
//!
//! Validates a document's IR against a minimal structural schema (`type`,
//! `properties`, `required`, `items`) and maps every mismatch to the
//! offending key's source range, in the style of parser-combinator
//! validators: `Expected number, received undefined`.

use crate::diagnostic::Diagnostic;
use oas_diagnostics_codes::{DiagnosticCode, Severity};
use oas_ir::{Document, IrKind, IrNode};
use oas_position_tracking::ByteSpan;
use rustc_hash::FxHashSet;

/// Validate `doc` against an expected-shape schema, returning one
/// diagnostic per mismatch.
pub fn validate_against(doc: &Document, schema: &IrNode) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    if let Some(root) = doc.root() {
        check_node(doc, root, schema, &mut Vec::new(), &mut out);
    }
    out
}

fn check_node(
    doc: &Document,
    node: &IrNode,
    schema: &IrNode,
    path: &mut Vec<String>,
    out: &mut Vec<Diagnostic>,
) {
    if let Some(expected) = schema.child_str("type") {
        let actual = node.kind.name();
        if expected != actual {
            report(doc, node, expected, actual, path, out);
            return;
        }
    }

    if node.kind == IrKind::Object {
        let required: FxHashSet<&str> = schema
            .child("required")
            .map(|r| r.items().filter_map(IrNode::as_str).collect())
            .unwrap_or_default();
        if let Some(properties) = schema.child("properties") {
            for (name, subschema) in properties.entries() {
                match node.child(name) {
                    Some(child) => {
                        path.push(name.to_string());
                        check_node(doc, child, subschema, path, out);
                        path.pop();
                    }
                    None if required.contains(name) => {
                        path.push(name.to_string());
                        let expected = subschema.child_str("type").unwrap_or("value");
                        report(doc, node, expected, "undefined", path, out);
                        path.pop();
                    }
                    None => {}
                }
            }
        }
    }

    if node.kind == IrKind::Array {
        if let Some(items_schema) = schema.child("items") {
            for (i, item) in node.items().enumerate() {
                path.push(i.to_string());
                check_node(doc, item, items_schema, path, out);
                path.pop();
            }
        }
    }
}

fn report(
    doc: &Document,
    at: &IrNode,
    expected: &str,
    actual: &str,
    path: &[String],
    out: &mut Vec<Diagnostic>,
) {
    // The range targets the key of the deepest existing node.
    let span = at.loc.key_span().unwrap_or_else(|| ByteSpan::empty(at.loc.start));
    out.push(Diagnostic {
        rule_id: "validation-group".to_string(),
        severity: Severity::Error,
        code: Some(DiagnosticCode::ValidationGroup.to_string()),
        uri: doc.uri.clone(),
        range: doc.source_map.span_to_range(span),
        message: format!("Expected {expected}, received {actual} (at {})", path.join(".")),
        source: "oas".to_string(),
        link: None,
        related: Vec::new(),
        suggest: Vec::new(),
    });
}
