//! The per-document, per-rule reporting context.

use crate::diagnostic::{Diagnostic, RelatedInfo, Suggestion};
use oas_diagnostics_codes::{DiagnosticCode, Severity};
use oas_ir::Document;
use oas_position_tracking::{ByteSpan, WireRange};
use oas_graph::Resolver;
use oas_workspace_index::{ElementRef, Project};
use std::sync::Arc;

/// What a rule hands to `report`. The context fills in rule identity,
/// severity, and code.
#[derive(Debug, Default)]
pub struct Report {
    pub message: String,
    /// Defaults to the document under analysis.
    pub uri: Option<String>,
    pub range: WireRange,
    /// Overrides the resolved severity for this one finding.
    pub severity: Option<Severity>,
    /// Documentation URL to attach.
    pub link: Option<String>,
    pub related: Vec<RelatedInfo>,
    pub suggest: Vec<Suggestion>,
}

impl Report {
    pub fn new(message: impl Into<String>, range: WireRange) -> Self {
        Self { message: message.into(), range, ..Default::default() }
    }
}

/// Read access to the project plus range helpers and the report sink for
/// one rule over one document. Rules never mutate anything else.
pub struct RuleContext<'p> {
    project: &'p Project,
    uri: String,
    rule_id: &'static str,
    code: DiagnosticCode,
    severity: Severity,
    diagnostics: Vec<Diagnostic>,
}

impl<'p> RuleContext<'p> {
    pub(crate) fn new(
        project: &'p Project,
        uri: &str,
        rule_id: &'static str,
        code: DiagnosticCode,
        severity: Severity,
    ) -> Self {
        Self {
            project,
            uri: uri.to_string(),
            rule_id,
            code,
            severity,
            diagnostics: Vec::new(),
        }
    }

    /// The document under analysis.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn project(&self) -> &'p Project {
        self.project
    }

    pub fn document(&self) -> Option<Arc<Document>> {
        self.project.document(&self.uri)
    }

    pub fn resolver(&self) -> Resolver<'p> {
        self.project.resolver()
    }

    /// Range of the node at `uri#ptr` (the whole mapping pair for keyed
    /// nodes).
    pub fn locate(&self, uri: &str, ptr: &str) -> Option<WireRange> {
        let doc = self.project.document(uri)?;
        let node = doc.node_at(ptr)?;
        Some(doc.source_map.span_to_range(node.loc.span()))
    }

    /// Range of the key token of the node at `uri#ptr`.
    pub fn locate_key(&self, uri: &str, ptr: &str) -> Option<WireRange> {
        let doc = self.project.document(uri)?;
        let node = doc.node_at(ptr)?;
        Some(doc.source_map.span_to_range(node.loc.key_span()?))
    }

    /// Range of the value token, falling back to the node span.
    pub fn locate_value(&self, uri: &str, ptr: &str) -> Option<WireRange> {
        let doc = self.project.document(uri)?;
        let node = doc.node_at(ptr)?;
        let span = node.loc.value_span().unwrap_or_else(|| node.loc.span());
        Some(doc.source_map.span_to_range(span))
    }

    /// Range for raw byte offsets in a document.
    pub fn offset_range(&self, uri: &str, start: usize, end: usize) -> Option<WireRange> {
        let doc = self.project.document(uri)?;
        Some(doc.source_map.span_to_range(ByteSpan::new(start, end)))
    }

    /// Key range of `name` under the object at `parent_ptr`.
    pub fn find_key_range(&self, uri: &str, parent_ptr: &str, name: &str) -> Option<WireRange> {
        let doc = self.project.document(uri)?;
        let parent = doc.node_at(parent_ptr)?;
        let child = parent.child(name)?;
        let span = child.loc.key_span().unwrap_or_else(|| child.loc.span());
        Some(doc.source_map.span_to_range(span))
    }

    /// File a finding.
    pub fn report(&mut self, report: Report) {
        self.diagnostics.push(Diagnostic {
            rule_id: self.rule_id.to_string(),
            severity: report.severity.unwrap_or(self.severity),
            code: Some(self.code.to_string()),
            uri: report.uri.unwrap_or_else(|| self.uri.clone()),
            range: report.range,
            message: report.message,
            source: "oas".to_string(),
            link: report.link,
            related: report.related,
            suggest: report.suggest,
        });
    }

    /// File a finding against an indexed element, optionally at a child
    /// pointer below its definition. The range prefers the key token.
    pub fn report_at(&mut self, element: &ElementRef, sub_pointer: &str, mut report: Report) {
        let ptr = if sub_pointer.is_empty() {
            element.pointer.clone()
        } else {
            format!("{}{}", element.pointer.trim_end_matches('#'), sub_pointer)
        };
        let range = self
            .locate_key(&element.uri, &ptr)
            .or_else(|| self.locate(&element.uri, &ptr))
            .unwrap_or_default();
        report.uri = Some(element.uri.clone());
        report.range = range;
        self.report(report);
    }

    pub(crate) fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
