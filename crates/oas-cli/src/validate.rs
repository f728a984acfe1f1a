//! The `validate` subcommand.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use oas_diagnostics_codes::{DiagnosticCode, Severity};
use oas_position_tracking::WireRange;
use oas_rules::{AnalyzerConfig, Diagnostic, FullReport, RuleEngine, validate_against};
use oas_uri::uri_key;
use oas_workspace_index::{CancelToken, DocumentStore, Project};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Files or directories to analyze.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Analyzer configuration file (JSON).
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Lowest severity to report.
    #[arg(long, value_parser = parse_severity, default_value = "hint")]
    pub min_severity: Severity,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

fn parse_severity(value: &str) -> Result<Severity, String> {
    Severity::parse(value).ok_or_else(|| format!("unknown severity '{value}'"))
}

pub fn run(args: ValidateArgs) -> Result<ExitCode> {
    let config = match &args.rules {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            AnalyzerConfig::from_json(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => AnalyzerConfig::default(),
    };
    let matcher = config.matcher().context("compiling include patterns")?;

    let files = discover(&args.paths, &matcher)?;
    if files.is_empty() {
        warn!("no matching files found");
    }

    let store = DocumentStore::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    for path in &files {
        let uri = path_uri(path);
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        match String::from_utf8(bytes) {
            Ok(text) => {
                store.open(&uri, &text);
            }
            Err(_) => diagnostics.push(synthetic_error(
                &uri,
                DiagnosticCode::ParseError,
                "file is not valid UTF-8",
            )),
        }
    }

    let token = CancelToken::new();
    let project = Project::build(store.snapshot(), &token);
    let uris = project.document_uris();

    let mut engine = RuleEngine::with_builtins();
    engine.apply_overrides(&config.rules_overrides);
    diagnostics.extend(engine.run(&project, &uris, &token).diagnostics);
    diagnostics.extend(run_validation_groups(&config, &project)?);

    diagnostics.retain(|d| d.severity.to_lsp_value() <= args.min_severity.to_lsp_value());

    match args.format {
        OutputFormat::Text => print_text(&diagnostics),
        OutputFormat::Json => print_json(&diagnostics, &uris)?,
    }
    Ok(ExitCode::from(exit_code(&diagnostics)))
}

/// Apply every configured validation group: each group's schemas are
/// loaded as documents and checked against the group's matching files.
fn run_validation_groups(config: &AnalyzerConfig, project: &Project) -> Result<Vec<Diagnostic>> {
    let mut out = Vec::new();
    for (label, group) in &config.additional_validation_groups {
        let matcher = oas_rules::build_matcher(&group.patterns)
            .with_context(|| format!("compiling patterns of validation group '{label}'"))?;
        for schema_ref in &group.schemas {
            let schema_uri = uri_key(&schema_ref.schema);
            let Some(schema_doc) = project.document(&schema_uri) else {
                debug!(group = %label, schema = %schema_uri, "schema document not loaded");
                continue;
            };
            let Some(schema) = schema_doc.root() else { continue };
            for uri in project.document_uris() {
                if uri == schema_uri || !matcher.is_match(uri_path(&uri)) {
                    continue;
                }
                let Some(doc) = project.document(&uri) else { continue };
                out.extend(validate_against(&doc, schema));
            }
        }
    }
    Ok(out)
}

fn discover(paths: &[PathBuf], matcher: &globset::GlobSet) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.exists() {
            anyhow::bail!("path does not exist: {}", path.display());
        }
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && matcher.is_match(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn path_uri(path: &Path) -> String {
    uri_key(&path.to_string_lossy())
}

/// Path part of a URI, for glob matching.
fn uri_path(uri: &str) -> &str {
    uri.strip_prefix("file://").unwrap_or(uri)
}

fn synthetic_error(uri: &str, code: DiagnosticCode, message: &str) -> Diagnostic {
    Diagnostic {
        rule_id: "parse-error".to_string(),
        severity: Severity::Error,
        code: Some(code.to_string()),
        uri: uri.to_string(),
        range: WireRange::default(),
        message: message.to_string(),
        source: "oas".to_string(),
        link: None,
        related: Vec::new(),
        suggest: Vec::new(),
    }
}

fn print_text(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        let code = d.code.as_deref().unwrap_or("-");
        println!(
            "{}:{}:{} {}[{}] {}: {}",
            d.uri,
            d.range.start.line + 1,
            d.range.start.character + 1,
            d.severity,
            code,
            d.rule_id,
            d.message
        );
    }
    match diagnostics.len() {
        0 => println!("clean"),
        1 => println!("1 finding"),
        n => println!("{n} findings"),
    }
}

fn print_json(diagnostics: &[Diagnostic], uris: &[String]) -> Result<()> {
    let reports = FullReport::group(diagnostics, uris);
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

fn exit_code(diagnostics: &[Diagnostic]) -> u8 {
    if diagnostics.iter().any(|d| d.severity == Severity::Error) {
        2
    } else if !diagnostics.is_empty() {
        1
    } else {
        0
    }
}
