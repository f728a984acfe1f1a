//! Rule metadata.

use oas_diagnostics_codes::{DiagnosticCode, Severity};
use oas_ir::OasVersion;

/// What a rule's findings are about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Violations of hard requirements.
    Problem,
    /// Improvements worth making.
    Suggestion,
    /// Purely informational findings.
    Informational,
}

/// Every OpenAPI version, including documents whose version is unknown.
/// Rules that apply universally use this as their `oas` list.
pub const ALL_OAS: &[OasVersion] = &[
    OasVersion::V2_0,
    OasVersion::V3_0,
    OasVersion::V3_1,
    OasVersion::V3_2,
    OasVersion::Unknown,
];

/// Static description of a rule: identity, defaults, and gating.
#[derive(Debug, Clone)]
pub struct RuleMeta {
    /// Stable kebab-case identifier, e.g. `path-kebab-case`.
    pub id: &'static str,
    /// Ordinal within the rule set.
    pub number: u16,
    pub kind: RuleKind,
    pub default_severity: Severity,
    pub code: DiagnosticCode,
    /// Versions the rule applies to; documents whose effective version is
    /// not listed are skipped silently.
    pub oas: &'static [OasVersion],
    /// Whether findings carry fix suggestions.
    pub fixable: bool,
    /// Skip the rule unless the document is a root.
    pub requires_root: bool,
    /// Skip the rule unless the document has a `paths` object.
    pub requires_paths: bool,
    /// Skip the rule unless the document has a `components` object.
    pub requires_components: bool,
}

impl RuleMeta {
    /// Baseline meta: applies everywhere, not fixable, no gating.
    pub const fn new(
        id: &'static str,
        number: u16,
        kind: RuleKind,
        default_severity: Severity,
        code: DiagnosticCode,
    ) -> Self {
        Self {
            id,
            number,
            kind,
            default_severity,
            code,
            oas: ALL_OAS,
            fixable: false,
            requires_root: false,
            requires_paths: false,
            requires_components: false,
        }
    }

    pub fn applies_to(&self, version: OasVersion) -> bool {
        self.oas.contains(&version)
    }
}
