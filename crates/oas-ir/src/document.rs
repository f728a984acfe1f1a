//! The per-file document model.

use crate::node::{IrKind, IrNode};
use crate::version::{HTTP_METHODS_BASE, OasVersion};
use oas_position_tracking::{ByteSpan, SourceMap};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Structural classification of a loaded file.
///
/// A `Root` document carries `openapi` or `swagger` at the top level;
/// everything else is a fragment meant to be `$ref`'d into a root. On
/// ambiguity the loader settles for `Unknown` and the index treats the
/// file as a generic schema fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Root,
    Schema,
    Parameter,
    Response,
    RequestBody,
    Example,
    PathItem,
    Unknown,
}

impl DocumentKind {
    pub fn is_root(self) -> bool {
        self == DocumentKind::Root
    }

    /// Classify a parsed root node by its shape.
    pub fn classify(root: &IrNode) -> Self {
        if root.kind != IrKind::Object {
            return DocumentKind::Unknown;
        }
        if root.child("openapi").is_some() || root.child("swagger").is_some() {
            return DocumentKind::Root;
        }
        if root.entries().any(|(k, _)| HTTP_METHODS_BASE.contains(&k)) {
            return DocumentKind::PathItem;
        }
        if root.child("name").is_some() && root.child("in").is_some() {
            return DocumentKind::Parameter;
        }
        if root.child("content").is_some() && root.child("description").is_some() {
            // Responses and request bodies share `content`; a response is
            // required to have `description`, a request body rarely does.
            return DocumentKind::Response;
        }
        if root.child("content").is_some() {
            return DocumentKind::RequestBody;
        }
        if root.child("value").is_some() && root.child("schema").is_none() {
            return DocumentKind::Example;
        }
        if root.child("type").is_some()
            || root.child("properties").is_some()
            || root.child("allOf").is_some()
            || root.child("oneOf").is_some()
            || root.child("anyOf").is_some()
            || root.child("items").is_some()
        {
            return DocumentKind::Schema;
        }
        DocumentKind::Unknown
    }
}

/// A parse problem attached to a document; the loader never fails a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseIssue {
    pub message: String,
    pub span: ByteSpan,
}

/// One loaded file: raw text, IR, source map, and detected metadata.
///
/// Documents are immutable; a reload replaces the whole value and every
/// derived structure keyed by the URI.
#[derive(Debug, Clone)]
pub struct Document {
    /// Canonical URI (see `oas_uri::uri_key`).
    pub uri: String,
    /// Source map over the raw text; also owns the text.
    pub source_map: Arc<SourceMap>,
    /// Parsed tree; `None` after an unrecoverable parse error.
    pub ir: Option<IrNode>,
    /// Content hash of the raw text.
    pub hash: String,
    /// Filesystem mtime when known (seconds since epoch).
    pub mtime: Option<u64>,
    /// Version declared on the root, `Unknown` for fragments.
    pub version: OasVersion,
    /// Structural classification.
    pub kind: DocumentKind,
    /// Problems found while parsing.
    pub parse_issues: Vec<ParseIssue>,
}

impl Document {
    /// The raw document text.
    pub fn text(&self) -> &str {
        self.source_map.text()
    }

    /// Root IR node, when the document parsed.
    pub fn root(&self) -> Option<&IrNode> {
        self.ir.as_ref()
    }

    /// Resolve a canonical fragment pointer inside this document.
    pub fn node_at(&self, ptr: &str) -> Option<&IrNode> {
        self.ir.as_ref()?.get(ptr)
    }

    /// Version declared on the root; fragments report `Unknown` here and
    /// inherit their effective version from whichever root references them.
    pub fn declared_version(&self) -> OasVersion {
        self.version
    }

    pub fn is_root(&self) -> bool {
        self.kind.is_root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeLoc, ScalarValue};

    fn obj_with(keys: &[(&str, &str)]) -> IrNode {
        let mut root = IrNode::container(IrKind::Object, "#".to_string(), NodeLoc::new(0, 10));
        for (k, v) in keys {
            let mut child = IrNode::scalar(
                IrKind::String,
                ScalarValue::String((*v).to_string()),
                format!("#/{k}"),
                NodeLoc::new(0, 0),
            );
            child.key = Some((*k).to_string());
            root.children.push(child);
        }
        root
    }

    #[test]
    fn test_classify_root() {
        assert_eq!(DocumentKind::classify(&obj_with(&[("openapi", "3.1.0")])), DocumentKind::Root);
        assert_eq!(DocumentKind::classify(&obj_with(&[("swagger", "2.0")])), DocumentKind::Root);
    }

    #[test]
    fn test_classify_path_item() {
        assert_eq!(
            DocumentKind::classify(&obj_with(&[("get", "x"), ("summary", "s")])),
            DocumentKind::PathItem
        );
    }

    #[test]
    fn test_classify_parameter() {
        assert_eq!(
            DocumentKind::classify(&obj_with(&[("name", "id"), ("in", "path")])),
            DocumentKind::Parameter
        );
    }

    #[test]
    fn test_classify_schema() {
        assert_eq!(
            DocumentKind::classify(&obj_with(&[("type", "object"), ("properties", "p")])),
            DocumentKind::Schema
        );
    }

    #[test]
    fn test_classify_ambiguous_is_unknown() {
        assert_eq!(DocumentKind::classify(&obj_with(&[("foo", "bar")])), DocumentKind::Unknown);
        let scalar = IrNode::scalar(
            IrKind::String,
            ScalarValue::String("just text".to_string()),
            "#".to_string(),
            NodeLoc::new(0, 9),
        );
        assert_eq!(DocumentKind::classify(&scalar), DocumentKind::Unknown);
    }
}
