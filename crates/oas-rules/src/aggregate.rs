//! Diagnostic aggregation: dedup, stable sort, pull reports.

use crate::diagnostic::Diagnostic;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Collapse identical repeats and sort for stable output.
///
/// Dedup key: `(rule_id, uri, range, message)`. Sort key:
/// `(uri, start line, start character, rule_id)`.
pub fn aggregate(mut diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    diagnostics.sort_by(|a, b| {
        a.uri
            .cmp(&b.uri)
            .then(a.range.start.line.cmp(&b.range.start.line))
            .then(a.range.start.character.cmp(&b.range.start.character))
            .then(a.rule_id.cmp(&b.rule_id))
            .then(a.message.cmp(&b.message))
    });
    diagnostics.dedup_by(|a, b| {
        a.rule_id == b.rule_id && a.uri == b.uri && a.range == b.range && a.message == b.message
    });
    diagnostics
}

/// A workspace pull-diagnostics report for one document.
#[derive(Debug, Clone, Serialize)]
pub struct FullReport {
    /// Always `"full"`; hosts compare against `"unchanged"`.
    pub kind: &'static str,
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    pub items: Vec<Diagnostic>,
}

impl FullReport {
    /// Group aggregated diagnostics into one report per URI, in URI order.
    /// Documents of `uris` with no findings still get an empty report.
    pub fn group(diagnostics: &[Diagnostic], uris: &[String]) -> Vec<FullReport> {
        let mut by_uri: FxHashMap<&str, Vec<Diagnostic>> = FxHashMap::default();
        for diagnostic in diagnostics {
            by_uri.entry(diagnostic.uri.as_str()).or_default().push(diagnostic.clone());
        }
        let mut sorted: Vec<String> = uris.to_vec();
        sorted.sort();
        sorted.dedup();
        sorted
            .into_iter()
            .map(|uri| {
                let items = by_uri.remove(uri.as_str()).unwrap_or_default();
                FullReport { kind: "full", uri, version: None, items }
            })
            .collect()
    }
}
