//! Analyzer configuration as consumed by the engine.
//!
//! Loading the file from disk is the host's job; this module only defines
//! the shape and the glob matching.

use globset::{Glob, GlobSet, GlobSetBuilder};
use oas_diagnostics_codes::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default include patterns for workspace discovery.
pub const DEFAULT_PATTERNS: &[&str] = &["**/*.{yaml,yml,json,jsonc}"];

/// A configured severity override for one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityOverride {
    /// Drop the rule entirely.
    Off,
    /// Replace the default severity.
    Set(Severity),
}

impl SeverityOverride {
    pub fn parse(value: &str) -> Option<Self> {
        if value == "off" {
            return Some(SeverityOverride::Off);
        }
        Severity::parse(value).map(SeverityOverride::Set)
    }
}

/// A custom rule loadable from the workspace, optionally gated to a glob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomRuleRef {
    /// Path or identifier of the rule.
    pub rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// A schema applied to matching files within a validation group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupSchemaRef {
    /// Workspace path of the expected-shape schema document.
    pub schema: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Extra schemas/rules applied to non-OpenAPI files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ValidationGroup {
    pub patterns: Vec<String>,
    pub schemas: Vec<GroupSchemaRef>,
    pub rules: Vec<CustomRuleRef>,
}

/// Workspace-scoped analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerConfig {
    /// Glob include list for workspace discovery.
    pub patterns: Vec<String>,
    /// `ruleId` → `"off" | "error" | "warn" | "info" | "hint"`.
    pub rules_overrides: BTreeMap<String, String>,
    /// Custom rules loadable from the workspace.
    pub rules: Vec<CustomRuleRef>,
    /// Label → group of extra schemas/rules for non-OpenAPI files.
    pub additional_validation_groups: BTreeMap<String, ValidationGroup>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.iter().map(|p| (*p).to_string()).collect(),
            rules_overrides: BTreeMap::new(),
            rules: Vec::new(),
            additional_validation_groups: BTreeMap::new(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Compiled matcher over the include patterns.
    pub fn matcher(&self) -> Result<GlobSet, globset::Error> {
        build_matcher(&self.patterns)
    }
}

/// Compile a glob list into one matcher.
pub fn build_matcher(patterns: &[String]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}
