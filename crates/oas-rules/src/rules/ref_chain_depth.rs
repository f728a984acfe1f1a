//! `ref-chain-depth`: `$ref` chains must stay under the hop limit.

use crate::context::{Report, RuleContext};
use crate::meta::{RuleKind, RuleMeta};
use crate::rules::{Rule, RuleResult, RuleVisitor};
use oas_diagnostics_codes::{DiagnosticCode, Severity};
use oas_graph::UnresolvedRefError;
use oas_uri::is_external_uri;
use oas_workspace_index::RefNodeRef;

static META: RuleMeta = RuleMeta::new(
    "ref-chain-depth",
    4,
    RuleKind::Problem,
    Severity::Error,
    DiagnosticCode::RefChainDepth,
);

pub struct RefChainDepth;

impl Rule for RefChainDepth {
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
        if is_external_uri(&reference.ref_string) {
            return Ok(());
        }
        match ctx.resolver().follow(&reference.element.uri, &reference.ref_string) {
            Err(err @ UnresolvedRefError::ChainTooDeep { .. }) => {
                let range = ctx
                    .locate(&reference.element.uri, &reference.element.pointer)
                    .unwrap_or_default();
                ctx.report(Report {
                    uri: Some(reference.element.uri.clone()),
                    ..Report::new(err.to_string(), range)
                });
            }
            _ => {}
        }
        Ok(())
    }
}
