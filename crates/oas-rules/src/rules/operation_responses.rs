//! `operation-responses`: operations must declare the required error
//! response codes.

use crate::context::{Report, RuleContext};
use crate::meta::{RuleKind, RuleMeta};
use crate::rules::{Rule, RuleResult, RuleVisitor};
use oas_diagnostics_codes::{DiagnosticCode, Severity};
use oas_workspace_index::OperationRef;
use rustc_hash::FxHashSet;

/// Response codes every operation is expected to document.
const REQUIRED_CODES: &[&str] = &["400", "401", "403", "429", "500"];

static META: RuleMeta = RuleMeta::new(
    "operation-responses",
    103,
    RuleKind::Problem,
    Severity::Error,
    DiagnosticCode::OperationResponses,
);

pub struct OperationResponses;

impl Rule for OperationResponses {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn create(&self) -> Box<dyn RuleVisitor> {
        Box::new(Visitor)
    }
}

struct Visitor;

impl RuleVisitor for Visitor {
    fn check_operation(&mut self, ctx: &mut RuleContext<'_>, op: &OperationRef) -> RuleResult {
        let Some(doc) = ctx.project().document(&op.element.uri) else { return Ok(()) };
        let Some(op_node) = doc.node_at(&op.element.pointer) else { return Ok(()) };
        let declared: FxHashSet<&str> = op_node
            .child("responses")
            .map(|responses| responses.entries().map(|(code, _)| code).collect())
            .unwrap_or_default();
        let missing: Vec<&str> = REQUIRED_CODES
            .iter()
            .copied()
            .filter(|code| !declared.contains(code))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        // Range covers the `responses` key, or the method key when the
        // operation declares no responses at all.
        let range = ctx
            .find_key_range(&op.element.uri, &op.element.pointer, "responses")
            .or_else(|| ctx.locate_key(&op.element.uri, &op.element.pointer))
            .unwrap_or_default();
        ctx.report(Report {
            uri: Some(op.element.uri.clone()),
            ..Report::new(
                format!("Operation is missing required response codes [{}]", missing.join(", ")),
                range,
            )
        });
        Ok(())
    }
}
