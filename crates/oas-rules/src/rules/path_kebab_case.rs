//! `path-kebab-case`: path strings should be kebab-case.

use crate::context::{Report, RuleContext};
use crate::diagnostic::{FilePatch, PatchOp, PatchOpKind, Suggestion};
use crate::meta::{RuleKind, RuleMeta};
use crate::rules::{Rule, RuleResult, RuleVisitor};
use oas_diagnostics_codes::{DiagnosticCode, Severity};
use oas_uri::escape_token;
use oas_workspace_index::PathRef;
use once_cell::sync::Lazy;
use regex::Regex;

// One or more kebab words; template segments are checked separately.
static KEBAB_SEGMENT: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:[.-][a-z0-9]+)*$").ok());

static META: RuleMeta = RuleMeta {
    id: "path-kebab-case",
    number: 101,
    kind: RuleKind::Informational,
    default_severity: Severity::Info,
    code: DiagnosticCode::PathKebabCase,
    oas: crate::meta::ALL_OAS,
    fixable: true,
    requires_root: false,
    requires_paths: false,
    requires_components: false,
};

pub struct PathKebabCase;

impl Rule for PathKebabCase {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn create(&self) -> Box<dyn RuleVisitor> {
        Box::new(Visitor)
    }
}

struct Visitor;

impl RuleVisitor for Visitor {
    fn check_path_item(&mut self, ctx: &mut RuleContext<'_>, path: &PathRef) -> RuleResult {
        if path.path.split('/').all(segment_ok) {
            return Ok(());
        }
        let range = ctx
            .locate_key(&path.element.reference_uri, &path.element.reference_pointer)
            .unwrap_or_default();
        ctx.report(Report {
            uri: Some(path.element.reference_uri.clone()),
            suggest: rename_suggestion(ctx, path).into_iter().collect(),
            ..Report::new(
                format!("Path '{}' should be kebab-case", path.path),
                range,
            )
        });
        Ok(())
    }
}

/// A patch moving the entry to its kebab-cased path, when one is
/// mechanically derivable and the result is valid.
fn rename_suggestion(ctx: &RuleContext<'_>, path: &PathRef) -> Option<Suggestion> {
    let fixed = kebab_case(&path.path);
    if fixed == path.path || !fixed.split('/').all(segment_ok) {
        return None;
    }
    let uri = &path.element.reference_uri;
    let doc = ctx.project().document(uri)?;
    let item = doc.node_at(&path.element.reference_pointer)?;
    let new_pointer = format!("#/paths/{}", escape_token(&fixed));
    Some(Suggestion {
        title: format!("Rename to '{fixed}'"),
        fix: FilePatch {
            uri: uri.clone(),
            ops: vec![
                PatchOp {
                    op: PatchOpKind::Add,
                    path: new_pointer,
                    value: Some(item.to_plain_json()),
                },
                PatchOp {
                    op: PatchOpKind::Remove,
                    path: path.element.reference_pointer.clone(),
                    value: None,
                },
            ],
        },
    })
}

fn kebab_case(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 4);
    let mut in_template = false;
    let mut prev_lower = false;
    for ch in path.chars() {
        match ch {
            '{' => {
                in_template = true;
                out.push(ch);
                prev_lower = false;
            }
            '}' => {
                in_template = false;
                out.push(ch);
                prev_lower = false;
            }
            _ if in_template => out.push(ch),
            '_' => {
                out.push('-');
                prev_lower = false;
            }
            c if c.is_ascii_uppercase() => {
                if prev_lower {
                    out.push('-');
                }
                out.push(c.to_ascii_lowercase());
                prev_lower = false;
            }
            c => {
                out.push(c);
                prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            }
        }
    }
    out
}

fn segment_ok(segment: &str) -> bool {
    if segment.is_empty() {
        return true;
    }
    // Template parameters ({petId}) follow the parameter's own casing.
    if segment.starts_with('{') && segment.ends_with('}') {
        return true;
    }
    KEBAB_SEGMENT.as_ref().is_some_and(|re| re.is_match(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_case_conversion() {
        assert_eq!(kebab_case("/User-Accounts"), "/user-accounts");
        assert_eq!(kebab_case("/userAccounts"), "/user-accounts");
        assert_eq!(kebab_case("/user_accounts"), "/user-accounts");
        assert_eq!(kebab_case("/users/{petId}/orders"), "/users/{petId}/orders");
    }

    #[test]
    fn test_segment_validation() {
        assert!(segment_ok("user-accounts"));
        assert!(segment_ok("v2"));
        assert!(segment_ok("{petId}"));
        assert!(segment_ok(""));
        assert!(!segment_ok("User-Accounts"));
        assert!(!segment_ok("user_accounts"));
        assert!(!segment_ok("-leading"));
    }
}
