//! Rule engine and built-in rules for OpenAPI analysis.

mod aggregate;
mod config;
mod context;
mod diagnostic;
mod engine;
mod meta;
pub mod rules;
mod validation;

pub use aggregate::{FullReport, aggregate};
pub use config::{
    AnalyzerConfig, CustomRuleRef, DEFAULT_PATTERNS, GroupSchemaRef, SeverityOverride,
    ValidationGroup, build_matcher,
};
pub use context::{Report, RuleContext};
pub use diagnostic::{Diagnostic, FilePatch, PatchOp, PatchOpKind, RelatedInfo, Suggestion};
pub use engine::{RuleEngine, RunOutcome};
pub use meta::{ALL_OAS, RuleKind, RuleMeta};
pub use rules::{Rule, RuleError, RuleResult, RuleVisitor, builtin_rules};
pub use validation::validate_against;
