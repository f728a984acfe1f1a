//! Workspace rename for OpenAPI symbols.
//!
//! Two shapes of rename: an `operationId` (rewrite every declaration of
//! the id, sized exactly by the operationId index) and a component
//! (rewrite the definition key plus every `$ref` string that resolves to
//! it). Both produce a per-document text-edit set.

use oas_position_tracking::{WirePosition, WireRange};
use oas_references::ReferencesIndex;
use oas_uri::{escape_token, split_pointer};
use oas_workspace_index::Project;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// One text replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub range: WireRange,
    pub new_text: String,
}

/// The full rename result, grouped per document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenameEdit {
    pub edits: FxHashMap<String, Vec<TextEdit>>,
}

impl RenameEdit {
    pub fn is_empty(&self) -> bool {
        self.edits.values().all(Vec::is_empty)
    }

    /// Total number of individual text edits.
    pub fn len(&self) -> usize {
        self.edits.values().map(Vec::len).sum()
    }

    fn push(&mut self, uri: &str, edit: TextEdit) {
        self.edits.entry(uri.to_string()).or_default().push(edit);
    }
}

/// Rename the symbol at the position. Returns `None` when the position is
/// not on a renameable symbol.
pub fn rename(
    project: &Project,
    references: &ReferencesIndex,
    uri: &str,
    position: WirePosition,
    new_name: &str,
) -> Option<RenameEdit> {
    let doc = project.document(uri)?;
    let offset = doc.source_map.position_to_offset(position);
    let node = doc.root()?.node_at_offset(offset)?;

    if node.key.as_deref() == Some("operationId") {
        let old = node.as_str()?;
        return operation_id_rename(project, old, new_name);
    }

    let segments = split_pointer(&node.ptr);
    if segments.len() == 3 && segments[0] == "components" {
        return component_rename(project, references, uri, &node.ptr, &segments[2], new_name);
    }
    None
}

/// Rewrite every declaration of `old`. The edit set is exactly the
/// operationId index's occurrence list for the name.
fn operation_id_rename(project: &Project, old: &str, new_name: &str) -> Option<RenameEdit> {
    let occurrences = project.operation_ids().get_occurrences(old);
    if occurrences.is_empty() {
        return None;
    }
    let mut result = RenameEdit::default();
    for occurrence in occurrences {
        let Some(doc) = project.document(&occurrence.uri) else { continue };
        let Some(node) = doc.node_at(&occurrence.pointer) else { continue };
        let Some(span) = node.loc.value_span() else { continue };
        result.push(&occurrence.uri, TextEdit {
            range: doc.source_map.span_to_range(span),
            new_text: new_name.to_string(),
        });
    }
    Some(result)
}

/// Rewrite a component's key and every `$ref` whose resolved pointer is
/// the component.
fn component_rename(
    project: &Project,
    references: &ReferencesIndex,
    uri: &str,
    pointer: &str,
    old_name: &str,
    new_name: &str,
) -> Option<RenameEdit> {
    let mut result = RenameEdit::default();

    let doc = project.document(uri)?;
    let definition = doc.node_at(pointer)?;
    let key_span = definition.loc.key_span()?;
    result.push(uri, TextEdit {
        range: doc.source_map.span_to_range(key_span),
        new_text: new_name.to_string(),
    });

    let inbound = references.inbound_refs_to_pointer(project.docs(), uri, pointer, false);
    for reference in &inbound.locations {
        let Some(ref_doc) = project.document(&reference.uri) else { continue };
        let Some(holder) = ref_doc.node_at(&reference.pointer) else { continue };
        let Some(ref_node) = holder.child("$ref") else { continue };
        let Some(span) = ref_node.loc.value_span() else { continue };
        let new_ref = replace_last_segment(&reference.ref_string, old_name, new_name);
        // Preserve the quoting style of the original value.
        let quoted = match ref_doc.text().as_bytes().get(span.start) {
            Some(b'\'') => format!("'{new_ref}'"),
            Some(b'"') => format!("\"{new_ref}\""),
            _ => new_ref,
        };
        result.push(&reference.uri, TextEdit {
            range: ref_doc.source_map.span_to_range(span),
            new_text: quoted,
        });
    }
    Some(result)
}

fn replace_last_segment(ref_string: &str, old_name: &str, new_name: &str) -> String {
    let escaped_old = escape_token(old_name);
    match ref_string.rfind(&format!("/{escaped_old}")) {
        Some(at) if at + 1 + escaped_old.len() == ref_string.len() => {
            format!("{}/{}", &ref_string[..at], escape_token(new_name))
        }
        _ => ref_string.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oas_graph::DocumentSet;
    use oas_parser::load_document;
    use oas_tdd_support::must_some;
    use oas_workspace_index::CancelToken;

    fn project(files: &[(&str, &str)]) -> Project {
        let mut docs = DocumentSet::new();
        for (uri, text) in files {
            docs.insert(load_document(uri, text));
        }
        Project::build(docs, &CancelToken::new())
    }

    fn pos_of(text: &str, needle: &str, extra: u32) -> WirePosition {
        let offset = text.find(needle).unwrap_or(0);
        let before = &text[..offset];
        WirePosition::new(
            before.matches('\n').count() as u32,
            before.rsplit('\n').next().map_or(0, str::len) as u32 + extra,
        )
    }

    #[test]
    fn test_operation_id_rename_matches_occurrence_count() {
        const A: &str = concat!(
            "openapi: 3.1.0\n",
            "paths:\n",
            "  /u:\n",
            "    get:\n",
            "      operationId: listUsers\n",
            "      responses:\n",
            "        '200': { description: ok }\n",
        );
        const B: &str = concat!(
            "openapi: 3.1.0\n",
            "paths:\n",
            "  /v:\n",
            "    get:\n",
            "      operationId: listUsers\n",
            "      responses:\n",
            "        '200': { description: ok }\n",
        );
        let project = project(&[("file:///a.yaml", A), ("file:///b.yaml", B)]);
        let references = ReferencesIndex::new();
        let edit = must_some(rename(
            &project,
            &references,
            "file:///a.yaml",
            pos_of(A, "operationId: listUsers", 2),
            "fetchUsers",
        ));
        let expected = project.operation_ids().get_occurrences("listUsers").len();
        assert_eq!(edit.len(), expected);
        assert_eq!(edit.len(), 2);
        for edits in edit.edits.values() {
            assert!(edits.iter().all(|e| e.new_text == "fetchUsers"));
        }
    }

    #[test]
    fn test_component_rename_rewrites_key_and_refs() {
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
            "type: object\n",
            "properties:\n",
            "  owner:\n",
            "    $ref: './a.yaml#/components/schemas/User'\n",
        );
        let project = project(&[("file:///spec/a.yaml", A), ("file:///spec/b.yaml", B)]);
        let references = ReferencesIndex::new();
        let edit = must_some(rename(
            &project,
            &references,
            "file:///spec/a.yaml",
            pos_of(A, "    User:", 5),
            "Account",
        ));
        // Key + two refs.
        assert_eq!(edit.len(), 3);
        let a_edits = must_some(edit.edits.get("file:///spec/a.yaml").cloned());
        assert!(a_edits.iter().any(|e| e.new_text == "Account"));
        assert!(a_edits.iter().any(|e| e.new_text == "'#/components/schemas/Account'"));
        let b_edits = must_some(edit.edits.get("file:///spec/b.yaml").cloned());
        assert_eq!(b_edits[0].new_text, "'./a.yaml#/components/schemas/Account'");
    }

    #[test]
    fn test_rename_on_plain_node_returns_none() {
        let project = project(&[("file:///a.yaml", "openapi: 3.1.0\npaths: {}\n")]);
        let references = ReferencesIndex::new();
        assert!(
            rename(&project, &references, "file:///a.yaml", WirePosition::new(0, 2), "x").is_none()
        );
    }

    #[test]
    fn test_replace_last_segment() {
        assert_eq!(
            replace_last_segment("#/components/schemas/User", "User", "Account"),
            "#/components/schemas/Account"
        );
        assert_eq!(
            replace_last_segment("./a.yaml#/components/schemas/User", "User", "Account"),
            "./a.yaml#/components/schemas/Account"
        );
        // No trailing match: unchanged.
        assert_eq!(
            replace_last_segment("#/components/schemas/UserList", "User", "Account"),
            "#/components/schemas/UserList"
        );
    }
}
