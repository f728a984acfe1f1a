//! `document-ascii`: documents must contain only ASCII characters.

use crate::context::{Report, RuleContext};
use crate::meta::{RuleKind, RuleMeta};
use crate::rules::{Rule, RuleResult, RuleVisitor};
use oas_diagnostics_codes::{DiagnosticCode, Severity};
use oas_ir::Document;
use std::sync::Arc;

static META: RuleMeta = RuleMeta::new(
    "document-ascii",
    104,
    RuleKind::Problem,
    Severity::Error,
    DiagnosticCode::DocumentAscii,
);

pub struct DocumentAscii;

impl Rule for DocumentAscii {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn create(&self) -> Box<dyn RuleVisitor> {
        Box::new(Visitor)
    }
}

struct Visitor;

impl RuleVisitor for Visitor {
    fn check_document(&mut self, ctx: &mut RuleContext<'_>, doc: &Arc<Document>) -> RuleResult {
        let text = doc.text();
        for (offset, ch) in text.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            // Range covers exactly the offending character.
            let Some(range) = ctx.offset_range(&doc.uri, offset, offset + ch.len_utf8()) else {
                continue;
            };
            ctx.report(Report {
                uri: Some(doc.uri.clone()),
                ..Report::new(
                    format!("Only ASCII characters are allowed, found '{ch}'"),
                    range,
                )
            });
        }
        Ok(())
    }
}
