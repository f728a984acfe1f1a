//! `unresolved-ref`: every local `$ref` must resolve.

use crate::context::{Report, RuleContext};
use crate::meta::{RuleKind, RuleMeta};
use crate::rules::{Rule, RuleResult, RuleVisitor};
use oas_diagnostics_codes::{DiagnosticCode, Severity};
use oas_graph::UnresolvedRefError;
use oas_uri::is_external_uri;
use oas_workspace_index::RefNodeRef;

static META: RuleMeta = RuleMeta::new(
    "unresolved-ref",
    2,
    RuleKind::Problem,
    Severity::Error,
    DiagnosticCode::UnresolvedRef,
);

pub struct UnresolvedRef;

impl Rule for UnresolvedRef {
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
        // External documents are never loaded locally; their refs are the
        // business of a fetching host, not this rule.
        if is_external_uri(&reference.ref_string) {
            return Ok(());
        }
        let result = ctx.resolver().deref(&reference.element.uri, &reference.ref_string);
        let err = match result {
            Ok(_) => return Ok(()),
            // Chain depth is its own rule.
            Err(UnresolvedRefError::ChainTooDeep { .. }) => return Ok(()),
            Err(err) => err,
        };
        let value_ptr = format!("{}/$ref", reference.element.pointer);
        let range = ctx
            .locate_value(&reference.element.uri, &value_ptr)
            .or_else(|| ctx.locate(&reference.element.uri, &reference.element.pointer))
            .unwrap_or_default();
        ctx.report(Report {
            uri: Some(reference.element.uri.clone()),
            ..Report::new(format!("Unresolved reference: {err}"), range)
        });
        Ok(())
    }
}
