//! `ref-cycle`: references must not form cycles.

use crate::context::{Report, RuleContext};
use crate::meta::{RuleKind, RuleMeta};
use crate::rules::{Rule, RuleResult, RuleVisitor};
use oas_diagnostics_codes::{DiagnosticCode, Severity};
use oas_graph::GraphNode;
use oas_workspace_index::RefNodeRef;

static META: RuleMeta = RuleMeta::new(
    "ref-cycle",
    3,
    RuleKind::Problem,
    Severity::Error,
    DiagnosticCode::RefCycle,
);

pub struct RefCycle;

impl Rule for RefCycle {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn create(&self) -> Box<dyn RuleVisitor> {
        Box::new(Visitor)
    }
}

struct Visitor;

impl RuleVisitor for Visitor {
    fn check_reference(&mut self, ctx: &mut RuleContext<'_>, reference: &RefNodeRef) -> RuleResult {
        let node = GraphNode::new(&reference.element.uri, &reference.element.pointer);
        if !ctx.project().graph().has_cycle(&node) {
            return Ok(());
        }
        let range = ctx
            .locate(&reference.element.uri, &reference.element.pointer)
            .unwrap_or_default();
        ctx.report(Report {
            uri: Some(reference.element.uri.clone()),
            ..Report::new("Reference cycle detected", range)
        });
        Ok(())
    }
}
