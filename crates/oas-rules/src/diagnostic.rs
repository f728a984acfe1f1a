//! Diagnostic and fix-patch types.

use oas_diagnostics_codes::Severity;
use oas_position_tracking::WireRange;
use serde::{Deserialize, Serialize};

/// A location related to a diagnostic (the "other" occurrence of a
/// duplicate, the definition of a conflicting element).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedInfo {
    pub uri: String,
    pub range: WireRange,
    pub message: String,
}

/// JSON-Patch-style operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOpKind {
    Add,
    Replace,
    Remove,
}

/// One patch operation targeting a JSON Pointer inside a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOp {
    pub op: PatchOpKind,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// A language-agnostic fix: patch operations against one document. Hosts
/// apply patches however they edit text; the engine never couples fixes
/// to textual editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePatch {
    pub uri: String,
    pub ops: Vec<PatchOp>,
}

/// A proposed fix attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub fix: FilePatch,
}

/// One finding, LSP-compatible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule_id: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub uri: String,
    pub range: WireRange,
    pub message: String,
    pub source: String,
    /// Documentation URL for the finding, when the rule provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub related: Vec<RelatedInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub suggest: Vec<Suggestion>,
}

impl Diagnostic {
    /// Key used for deduplication: identical repeats collapse.
    pub fn dedup_key(&self) -> (String, String, WireRange, String) {
        (self.rule_id.clone(), self.uri.clone(), self.range, self.message.clone())
    }
}
