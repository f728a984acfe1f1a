//! `operationid-unique`: operationId values must be unique workspace-wide.

use crate::context::{Report, RuleContext};
use crate::diagnostic::RelatedInfo;
use crate::meta::{RuleKind, RuleMeta};
use crate::rules::{Rule, RuleResult, RuleVisitor};
use oas_diagnostics_codes::{DiagnosticCode, Severity};
use oas_workspace_index::OperationRef;

static META: RuleMeta = RuleMeta::new(
    "operationid-unique",
    102,
    RuleKind::Problem,
    Severity::Error,
    DiagnosticCode::OperationIdUnique,
);

pub struct OperationIdUnique;

impl Rule for OperationIdUnique {
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
        let Some(id) = &op.operation_id else { return Ok(()) };
        let occurrences = ctx.project().operation_ids().get_occurrences(id);
        if occurrences.len() < 2 {
            return Ok(());
        }
        let own_pointer = format!("{}/operationId", op.element.pointer);
        let range = ctx
            .locate_value(&op.element.uri, &own_pointer)
            .unwrap_or_default();
        let related: Vec<RelatedInfo> = occurrences
            .iter()
            .filter(|occ| !(occ.uri == op.element.uri && occ.pointer == own_pointer))
            .filter_map(|occ| {
                Some(RelatedInfo {
                    uri: occ.uri.clone(),
                    range: ctx.locate_value(&occ.uri, &occ.pointer)?,
                    message: format!("'{id}' is also declared here"),
                })
            })
            .collect();
        ctx.report(Report {
            uri: Some(op.element.uri.clone()),
            related,
            ..Report::new(format!("operationId '{id}' is not unique"), range)
        });
        Ok(())
    }
}
