//! End-to-end engine runs over small workspaces.

use oas_diagnostics_codes::Severity;
use oas_graph::DocumentSet;
use oas_ir::OasVersion;
use oas_parser::load_document;
use oas_rules::rules::{Rule, RuleResult, RuleVisitor};
use oas_rules::{Diagnostic, Report, RuleContext, RuleEngine, RuleError, RuleKind, RuleMeta};
use oas_tdd_support::must_some;
use oas_workspace_index::{CancelToken, OperationRef, Project};
use std::collections::BTreeMap;
use std::sync::Arc;

fn run(files: &[(&str, &str)]) -> Vec<Diagnostic> {
    run_engine(files, RuleEngine::with_builtins())
}

fn run_engine(files: &[(&str, &str)], engine: RuleEngine) -> Vec<Diagnostic> {
    let mut docs = DocumentSet::new();
    for (uri, text) in files {
        docs.insert(load_document(uri, text));
    }
    let project = Project::build(docs, &CancelToken::new());
    let uris = project.document_uris();
    engine.run(&project, &uris, &CancelToken::new()).diagnostics
}

fn of_rule<'d>(diagnostics: &'d [Diagnostic], rule: &str) -> Vec<&'d Diagnostic> {
    diagnostics.iter().filter(|d| d.rule_id == rule).collect()
}

#[test]
fn test_kebab_case_scenario() {
    let diagnostics = run(&[(
        "file:///api.yaml",
        concat!(
            "openapi: 3.1.0\n",
            "paths:\n",
            "  /User-Accounts:\n",
            "    get:\n",
            "      responses:\n",
            "        '400': { description: e }\n",
            "        '401': { description: e }\n",
            "        '403': { description: e }\n",
            "        '429': { description: e }\n",
            "        '500': { description: e }\n",
            "  /user-accounts:\n",
            "    get:\n",
            "      responses:\n",
            "        '400': { description: e }\n",
            "        '401': { description: e }\n",
            "        '403': { description: e }\n",
            "        '429': { description: e }\n",
            "        '500': { description: e }\n",
        ),
    )]);
    let kebab = of_rule(&diagnostics, "path-kebab-case");
    assert_eq!(kebab.len(), 1);
    let diagnostic = kebab[0];
    assert_eq!(diagnostic.severity, Severity::Info);
    assert!(diagnostic.message.contains("should be kebab-case"));
    assert!(diagnostic.message.contains("/User-Accounts"));
    // The range covers the `/User-Accounts` key on line 2.
    assert_eq!(diagnostic.range.start.line, 2);
    assert_eq!(diagnostic.range.start.character, 2);
    assert_eq!(diagnostic.range.end.character, 2 + "/User-Accounts".len() as u32);
}

#[test]
fn test_operationid_unique_scenario() {
    const OP: &str = concat!(
        "openapi: 3.1.0\n",
        "paths:\n",
        "  /users:\n",
        "    get:\n",
        "      operationId: listUsers\n",
        "      responses:\n",
        "        '400': { description: e }\n",
        "        '401': { description: e }\n",
        "        '403': { description: e }\n",
        "        '429': { description: e }\n",
        "        '500': { description: e }\n",
    );
    let diagnostics = run(&[("file:///a.yaml", OP), ("file:///b.yaml", OP)]);
    let dups = of_rule(&diagnostics, "operationid-unique");
    assert_eq!(dups.len(), 2);
    let by_uri: Vec<&str> = dups.iter().map(|d| d.uri.as_str()).collect();
    assert!(by_uri.contains(&"file:///a.yaml"));
    assert!(by_uri.contains(&"file:///b.yaml"));
    for diagnostic in dups {
        assert_eq!(diagnostic.related.len(), 1);
        assert_ne!(diagnostic.related[0].uri, diagnostic.uri);
    }
}

#[test]
fn test_ref_cycle_scenario() {
    let diagnostics = run(&[
        (
            "file:///spec/a.yaml",
            "components:\n  schemas:\n    A:\n      $ref: './b.yaml#/components/schemas/B'\n",
        ),
        (
            "file:///spec/b.yaml",
            "components:\n  schemas:\n    B:\n      $ref: './a.yaml#/components/schemas/A'\n",
        ),
    ]);
    let cycles = of_rule(&diagnostics, "ref-cycle");
    assert_eq!(cycles.len(), 2);
    for diagnostic in &cycles {
        assert_eq!(diagnostic.message, "Reference cycle detected");
        assert_eq!(diagnostic.severity, Severity::Error);
    }
    let uris: Vec<&str> = cycles.iter().map(|d| d.uri.as_str()).collect();
    assert!(uris.contains(&"file:///spec/a.yaml"));
    assert!(uris.contains(&"file:///spec/b.yaml"));
}

#[test]
fn test_operation_responses_scenario() {
    let diagnostics = run(&[(
        "file:///api.yaml",
        concat!(
            "openapi: 3.1.0\n",
            "paths:\n",
            "  /users:\n",
            "    get:\n",
            "      responses:\n",
            "        '200':\n",
            "          description: ok\n",
        ),
    )]);
    let missing = of_rule(&diagnostics, "operation-responses");
    assert_eq!(missing.len(), 1);
    let diagnostic = missing[0];
    assert!(diagnostic.message.contains("[400, 401, 403, 429, 500]"));
    assert_eq!(diagnostic.severity, Severity::Error);
    // Range covers the `responses` key on line 4.
    assert_eq!(diagnostic.range.start.line, 4);
    assert_eq!(diagnostic.range.start.character, 6);
    assert_eq!(diagnostic.range.end.character, 6 + "responses".len() as u32);
}

#[test]
fn test_document_ascii_scenario() {
    // The 'é' sits at a known byte offset; the diagnostic range covers
    // exactly that one character.
    let text = "openapi: 3.1.0\ninfo:\n  title: Caf\u{e9} API\npaths: {}\n";
    let diagnostics = run(&[("file:///api.yaml", text)]);
    let ascii = of_rule(&diagnostics, "document-ascii");
    assert_eq!(ascii.len(), 1);
    let diagnostic = ascii[0];
    assert_eq!(diagnostic.severity, Severity::Error);
    assert!(diagnostic.message.contains("Only ASCII characters are allowed"));
    assert_eq!(diagnostic.range.start.line, 2);
    assert_eq!(diagnostic.range.start.character, 12);
    assert_eq!(diagnostic.range.end.line, 2);
    assert_eq!(diagnostic.range.end.character, 13);
}

#[test]
fn test_unresolved_ref_reported() {
    let diagnostics = run(&[(
        "file:///api.yaml",
        concat!(
            "openapi: 3.1.0\n",
            "paths:\n",
            "  /u:\n",
            "    get:\n",
            "      responses:\n",
            "        '400': { description: e }\n",
            "        '401': { description: e }\n",
            "        '403': { description: e }\n",
            "        '429': { description: e }\n",
            "        '500':\n",
            "          content:\n",
            "            application/json:\n",
            "              schema:\n",
            "                $ref: './missing.yaml#/X'\n",
        ),
    )]);
    let unresolved = of_rule(&diagnostics, "unresolved-ref");
    assert_eq!(unresolved.len(), 1);
    assert!(unresolved[0].message.contains("document not loaded"));
}

#[test]
fn test_external_refs_not_reported_unresolved() {
    let diagnostics = run(&[(
        "file:///api.yaml",
        "components:\n  schemas:\n    Pet:\n      $ref: 'https://example.com/pet.json#/Pet'\n",
    )]);
    assert!(of_rule(&diagnostics, "unresolved-ref").is_empty());
}

#[test]
fn test_overrides_drop_and_reseverity() {
    let files: &[(&str, &str)] = &[(
        "file:///api.yaml",
        concat!(
            "openapi: 3.1.0\n",
            "paths:\n",
            "  /Bad_Path:\n",
            "    get:\n",
            "      responses:\n",
            "        '200':\n",
            "          description: ok\n",
        ),
    )];

    let mut engine = RuleEngine::with_builtins();
    let mut overrides = BTreeMap::new();
    overrides.insert("operation-responses".to_string(), "off".to_string());
    overrides.insert("path-kebab-case".to_string(), "error".to_string());
    engine.apply_overrides(&overrides);
    let diagnostics = run_engine(files, engine);

    assert!(of_rule(&diagnostics, "operation-responses").is_empty());
    let kebab = of_rule(&diagnostics, "path-kebab-case");
    assert_eq!(kebab.len(), 1);
    assert_eq!(kebab[0].severity, Severity::Error);
}

#[test]
fn test_parse_error_becomes_diagnostic() {
    let diagnostics = run(&[("file:///broken.yaml", "a: [1, 2\n")]);
    let parse = of_rule(&diagnostics, "parse-error");
    assert_eq!(parse.len(), 1);
    assert_eq!(parse[0].severity, Severity::Error);
}

struct V31Only;

static V31_META: RuleMeta = RuleMeta {
    id: "v31-only",
    number: 900,
    kind: RuleKind::Problem,
    default_severity: Severity::Error,
    code: oas_diagnostics_codes::DiagnosticCode::RuleInternalError,
    oas: &[OasVersion::V3_1],
    fixable: false,
    requires_root: false,
    requires_paths: false,
    requires_components: false,
};

impl Rule for V31Only {
    fn meta(&self) -> &RuleMeta {
        &V31_META
    }
    fn create(&self) -> Box<dyn RuleVisitor> {
        Box::new(V31Visitor)
    }
}

struct V31Visitor;

impl RuleVisitor for V31Visitor {
    fn check_operation(&mut self, ctx: &mut RuleContext<'_>, op: &OperationRef) -> RuleResult {
        ctx.report(Report::new(
            format!("saw {}", op.method),
            ctx.locate(&op.element.uri, &op.element.pointer).unwrap_or_default(),
        ));
        Ok(())
    }
}

#[test]
fn test_version_gating_skips_rule() {
    let v30: &[(&str, &str)] = &[(
        "file:///api.yaml",
        "openapi: 3.0.3\npaths:\n  /u:\n    get:\n      responses:\n        '200': { description: ok }\n",
    )];
    let engine = RuleEngine::new(vec![Arc::new(V31Only)]);
    let diagnostics = run_engine(v30, engine);
    assert!(of_rule(&diagnostics, "v31-only").is_empty());

    let v31: &[(&str, &str)] = &[(
        "file:///api.yaml",
        "openapi: 3.1.0\npaths:\n  /u:\n    get:\n      responses:\n        '200': { description: ok }\n",
    )];
    let engine = RuleEngine::new(vec![Arc::new(V31Only)]);
    let diagnostics = run_engine(v31, engine);
    assert_eq!(of_rule(&diagnostics, "v31-only").len(), 1);
}

struct Exploding;

static EXPLODING_META: RuleMeta = RuleMeta::new(
    "exploding",
    901,
    RuleKind::Problem,
    Severity::Error,
    oas_diagnostics_codes::DiagnosticCode::RuleInternalError,
);

impl Rule for Exploding {
    fn meta(&self) -> &RuleMeta {
        &EXPLODING_META
    }
    fn create(&self) -> Box<dyn RuleVisitor> {
        Box::new(ExplodingVisitor)
    }
}

struct ExplodingVisitor;

impl RuleVisitor for ExplodingVisitor {
    fn check_document(
        &mut self,
        _ctx: &mut RuleContext<'_>,
        _doc: &Arc<oas_ir::Document>,
    ) -> RuleResult {
        Err(RuleError::new("boom"))
    }
}

#[test]
fn test_rule_internal_error_contained() {
    let files: &[(&str, &str)] = &[(
        "file:///api.yaml",
        "openapi: 3.1.0\npaths:\n  /User-Accounts:\n    get:\n      responses:\n        '200': { description: ok }\n",
    )];
    let mut rules: Vec<Arc<dyn Rule>> = vec![Arc::new(Exploding)];
    rules.extend(oas_rules::builtin_rules());
    let diagnostics = run_engine(files, RuleEngine::new(rules));

    let internal = of_rule(&diagnostics, "exploding");
    assert_eq!(internal.len(), 1);
    assert!(internal[0].message.contains("boom"));
    assert_eq!(must_some(internal[0].code.clone()), "OA900");
    // Other rules still ran.
    assert!(!of_rule(&diagnostics, "path-kebab-case").is_empty());
}

#[test]
fn test_deterministic_order_across_runs() {
    let files: &[(&str, &str)] = &[
        (
            "file:///b.yaml",
            "openapi: 3.1.0\npaths:\n  /Zed:\n    get:\n      responses:\n        '200': { description: ok }\n",
        ),
        (
            "file:///a.yaml",
            "openapi: 3.1.0\npaths:\n  /Alpha:\n    get:\n      responses:\n        '200': { description: ok }\n",
        ),
    ];
    let first = run(files);
    let second = run(files);
    assert_eq!(first, second);
    // Sorted by URI first.
    let uris: Vec<&str> = first.iter().map(|d| d.uri.as_str()).collect();
    let mut sorted = uris.clone();
    sorted.sort();
    assert_eq!(uris, sorted);
}

#[test]
fn test_cancellation_returns_empty() {
    let mut docs = DocumentSet::new();
    docs.insert(load_document(
        "file:///api.yaml",
        "openapi: 3.1.0\npaths:\n  /Bad_Path:\n    get: {}\n",
    ));
    let project = Project::build(docs, &CancelToken::new());
    let uris = project.document_uris();
    let token = CancelToken::new();
    token.cancel();
    let outcome = RuleEngine::with_builtins().run(&project, &uris, &token);
    assert!(outcome.diagnostics.is_empty());
}
