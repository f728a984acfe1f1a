//! Rule execution: gating, dispatch, failure containment.

use crate::aggregate::aggregate;
use crate::config::SeverityOverride;
use crate::context::RuleContext;
use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleError, RuleVisitor, builtin_rules};
use oas_diagnostics_codes::{DiagnosticCode, Severity};
use oas_ir::Document;
use oas_position_tracking::WireRange;
use oas_workspace_index::{CancelToken, Project};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of one engine run: aggregated, deduplicated, stably sorted
/// diagnostics.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub diagnostics: Vec<Diagnostic>,
}

/// Compiled rules plus configured severity overrides.
pub struct RuleEngine {
    rules: Vec<Arc<dyn Rule>>,
    overrides: FxHashMap<String, SeverityOverride>,
}

impl RuleEngine {
    pub fn new(rules: Vec<Arc<dyn Rule>>) -> Self {
        Self { rules, overrides: FxHashMap::default() }
    }

    /// Engine over the built-in rule set.
    pub fn with_builtins() -> Self {
        Self::new(builtin_rules())
    }

    /// Apply config overrides: `off` drops a rule, any severity replaces
    /// its default. Unknown values are ignored with a warning.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, String>) {
        for (rule_id, value) in overrides {
            match SeverityOverride::parse(value) {
                Some(parsed) => {
                    self.overrides.insert(rule_id.clone(), parsed);
                }
                None => warn!(rule = %rule_id, value = %value, "ignoring unknown severity override"),
            }
        }
    }

    /// Run every applicable rule over `uris`. Per-file failures yield
    /// diagnostics, never aborts; only cancellation stops the run early.
    pub fn run(&self, project: &Project, uris: &[String], token: &CancelToken) -> RunOutcome {
        let mut diagnostics = Vec::new();
        for uri in uris {
            if token.is_cancelled() {
                break;
            }
            let Some(doc) = project.document(uri) else { continue };
            self.run_document(project, &doc, &mut diagnostics);
        }
        RunOutcome { diagnostics: aggregate(diagnostics) }
    }

    fn run_document(&self, project: &Project, doc: &Arc<Document>, out: &mut Vec<Diagnostic>) {
        let uri = doc.uri.clone();
        for issue in &doc.parse_issues {
            out.push(Diagnostic {
                rule_id: "parse-error".to_string(),
                severity: Severity::Error,
                code: Some(DiagnosticCode::ParseError.to_string()),
                uri: uri.clone(),
                range: doc.source_map.span_to_range(issue.span),
                message: issue.message.clone(),
                source: "oas".to_string(),
                link: None,
                related: Vec::new(),
                suggest: Vec::new(),
            });
        }

        let version = project.effective_version(&uri);
        debug!(uri = %uri, version = %version, "running rules");

        for rule in &self.rules {
            let meta = rule.meta();
            let severity = match self.overrides.get(meta.id) {
                Some(SeverityOverride::Off) => continue,
                Some(SeverityOverride::Set(severity)) => *severity,
                None => meta.default_severity,
            };
            if !meta.applies_to(version) {
                continue;
            }
            if meta.requires_root && !doc.is_root() {
                continue;
            }
            if meta.requires_paths && doc.root().and_then(|r| r.child("paths")).is_none() {
                continue;
            }
            if meta.requires_components && doc.root().and_then(|r| r.child("components")).is_none()
            {
                continue;
            }

            let mut ctx = RuleContext::new(project, &uri, meta.id, meta.code, severity);
            let mut visitor = rule.create();
            if let Err(err) = dispatch(visitor.as_mut(), &mut ctx, project, doc) {
                out.push(internal_error(&uri, meta.id, &err));
            }
            out.extend(ctx.take_diagnostics());
        }
    }
}

/// A visitor failure becomes a single error diagnostic at the document
/// root; other rules keep running.
fn internal_error(uri: &str, rule_id: &str, err: &RuleError) -> Diagnostic {
    warn!(uri = %uri, rule = %rule_id, error = %err, "rule failed");
    Diagnostic {
        rule_id: rule_id.to_string(),
        severity: Severity::Error,
        code: Some(DiagnosticCode::RuleInternalError.to_string()),
        uri: uri.to_string(),
        range: WireRange::default(),
        message: format!("Rule '{rule_id}' failed: {err}"),
        source: "oas".to_string(),
        link: None,
        related: Vec::new(),
        suggest: Vec::new(),
    }
}

/// Fixed dispatch order over the indexed elements of one document:
/// Document, Root, Tag/Server/SecurityScheme, PathItem, Operation,
/// Parameter, RequestBody, Response, MediaType, Header, Link, Callback,
/// Schema, Reference, Webhook, Component.
fn dispatch(
    visitor: &mut dyn RuleVisitor,
    ctx: &mut RuleContext<'_>,
    project: &Project,
    doc: &Arc<Document>,
) -> Result<(), RuleError> {
    let uri = doc.uri.as_str();
    let index = project.index();
    let here = |reference_uri: &str| reference_uri == uri;

    visitor.check_document(ctx, doc)?;
    if doc.is_root() {
        visitor.check_root(ctx, doc)?;
    }
    for tag in index.tags.iter().filter(|t| here(&t.element.reference_uri)) {
        visitor.check_tag(ctx, tag)?;
    }
    for server in index.servers.iter().filter(|s| here(&s.element.reference_uri)) {
        visitor.check_server(ctx, server)?;
    }
    for scheme in index.security_schemes.iter().filter(|s| here(&s.element.reference_uri)) {
        visitor.check_security_scheme(ctx, scheme)?;
    }
    for path in index.paths.iter().filter(|p| here(&p.element.reference_uri)) {
        visitor.check_path_item(ctx, path)?;
    }
    for op in index.operations.iter().filter(|o| here(&o.element.reference_uri)) {
        visitor.check_operation(ctx, op)?;
    }
    for param in index.parameters.iter().filter(|p| here(&p.element.reference_uri)) {
        visitor.check_parameter(ctx, param)?;
    }
    for body in index.request_bodies.iter().filter(|b| here(&b.element.reference_uri)) {
        visitor.check_request_body(ctx, body)?;
    }
    for response in index.responses.iter().filter(|r| here(&r.element.reference_uri)) {
        visitor.check_response(ctx, response)?;
    }
    for mt in index.media_types.iter().filter(|m| here(&m.element.reference_uri)) {
        visitor.check_media_type(ctx, mt)?;
    }
    for header in index.headers.iter().filter(|h| here(&h.element.reference_uri)) {
        visitor.check_header(ctx, header)?;
    }
    for link in index.links.iter().filter(|l| here(&l.element.reference_uri)) {
        visitor.check_link(ctx, link)?;
    }
    for callback in index.callbacks.iter().filter(|c| here(&c.element.reference_uri)) {
        visitor.check_callback(ctx, callback)?;
    }
    for schema in index.schemas.iter().filter(|s| here(&s.element.reference_uri)) {
        visitor.check_schema(ctx, schema)?;
    }
    for reference in index.refs.iter().filter(|r| here(&r.element.reference_uri)) {
        visitor.check_reference(ctx, reference)?;
    }
    for webhook in index.webhooks.iter().filter(|w| here(&w.element.reference_uri)) {
        visitor.check_webhook(ctx, webhook)?;
    }
    for component in index.components.iter().filter(|c| here(&c.element.reference_uri)) {
        visitor.check_component(ctx, component)?;
    }
    Ok(())
}
