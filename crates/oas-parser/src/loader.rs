//! Document loading: parse, classify, detect version, hash.

use crate::builder::parse_ir;
use crate::jsonc::blank_comments;
use oas_ir::{Document, DocumentKind, IrNode, OasVersion};
use oas_position_tracking::SourceMap;
use oas_uri::{uri_extension, uri_key};
use std::sync::Arc;
use tracing::debug;

/// Classify a parsed root node. Exposed for callers that hold an IR without
/// the surrounding document.
pub fn identify_document_kind(root: &IrNode) -> DocumentKind {
    DocumentKind::classify(root)
}

/// Load `text` as the document at `uri` (canonicalized via
/// [`oas_uri::uri_key`]). Never fails: parse problems land in
/// `parse_issues` and leave the IR empty.
pub fn load_document(uri: &str, text: &str) -> Document {
    load_document_with_mtime(uri, text, None)
}

/// [`load_document`] with a filesystem mtime (seconds since epoch) recorded
/// on the result.
pub fn load_document_with_mtime(uri: &str, text: &str, mtime: Option<u64>) -> Document {
    let uri = uri_key(uri);
    let is_json = matches!(uri_extension(&uri), Some("json") | Some("jsonc"));
    // Blanking keeps every byte offset identical, so spans computed on the
    // stripped text apply to the original.
    let parse_text = if is_json { blank_comments(text) } else { text.to_string() };

    let (ir, parse_issues) = parse_ir(&parse_text);

    let kind = ir.as_ref().map_or(DocumentKind::Unknown, DocumentKind::classify);
    let version = ir.as_ref().map_or(OasVersion::Unknown, detect_version);
    let hash = format!("{:x}", md5::compute(text.as_bytes()));

    debug!(
        uri = %uri,
        kind = ?kind,
        version = %version,
        issues = parse_issues.len(),
        "loaded document"
    );

    Document {
        uri,
        source_map: Arc::new(SourceMap::new(text.to_string())),
        ir,
        hash,
        mtime,
        version,
        kind,
        parse_issues,
    }
}

/// Read `openapi` (3.x.y) or `swagger` (2.0) off the root; missing or
/// non-string fields yield `Unknown`.
fn detect_version(root: &IrNode) -> OasVersion {
    if let Some(value) = root.child_str("openapi") {
        return OasVersion::from_openapi(value);
    }
    if let Some(value) = root.child_str("swagger") {
        return OasVersion::from_swagger(value);
    }
    OasVersion::Unknown
}
