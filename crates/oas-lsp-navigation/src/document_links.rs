//! Document links: clickable targets for cross-file `$ref` values.

use oas_position_tracking::WireRange;
use oas_uri::resolve_ref;
use oas_workspace_index::Project;
use serde::Serialize;

/// One clickable link over a `$ref` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLink {
    pub range: WireRange,
    /// Resolved target, `uri#pointer`.
    pub target: String,
    /// True for `http(s)` targets the editor should open externally.
    pub external: bool,
}

/// Links for every `$ref` in one document that leaves the document.
/// Same-document fragments are navigation, not links; they are skipped.
pub fn document_links(project: &Project, uri: &str) -> Vec<DocumentLink> {
    let mut out = Vec::new();
    let Some(doc) = project.document(uri) else { return out };

    for reference in &project.index().refs {
        if reference.element.uri != uri {
            continue;
        }
        let target = resolve_ref(uri, &reference.ref_string);
        if target.uri == uri {
            continue;
        }
        let Some(holder) = doc.node_at(&reference.element.pointer) else { continue };
        let Some(ref_node) = holder.child("$ref") else { continue };
        let Some(span) = ref_node.loc.value_span() else { continue };
        out.push(DocumentLink {
            range: doc.source_map.span_to_range(span),
            target: format!("{}{}", target.uri, target.pointer),
            external: target.external,
        });
    }
    out.sort_by_key(|l| (l.range.start, l.range.end));
    out
}
