//! Stable diagnostic codes and severity levels for OpenAPI analysis.
//!
//! # Code Ranges
//!
//! | Range       | Category                    |
//! |-------------|-----------------------------|
//! | OA001-OA099 | Loading and resolution      |
//! | OA100-OA199 | API design rules            |
//! | OA200-OA299 | Validation groups           |
//! | OA900-OA999 | Engine internals            |
//!
//! # Example
//!
//! ```
//! use oas_diagnostics_codes::{DiagnosticCode, Severity};
//!
//! let code = DiagnosticCode::RefCycle;
//! assert_eq!(code.as_str(), "OA003");
//! assert_eq!(code.default_severity(), Severity::Error);
//! ```

use std::fmt;

/// Severity level of a diagnostic.
///
/// Maps to LSP DiagnosticSeverity values (1=Error, 2=Warning, 3=Info, 4=Hint).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum Severity {
    /// Violation that must be fixed.
    Error = 1,
    /// Issue that should be addressed.
    Warn = 2,
    /// Informational finding.
    Info = 3,
    /// Subtle suggestion.
    Hint = 4,
}

impl Severity {
    /// The LSP numeric value (1..4).
    pub fn to_lsp_value(self) -> u8 {
        self as u8
    }

    /// Parse a configuration string; `off` is not a severity and returns
    /// `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "error" => Some(Severity::Error),
            "warn" | "warning" => Some(Severity::Warn),
            "info" | "information" => Some(Severity::Info),
            "hint" => Some(Severity::Hint),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// Stable codes for every diagnostic the analyzer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagnosticCode {
    /// OA001: the document failed to parse.
    ParseError,
    /// OA002: a `$ref` target could not be resolved.
    UnresolvedRef,
    /// OA003: a reference cycle was detected.
    RefCycle,
    /// OA004: a `$ref` chain exceeded the hop limit.
    RefChainDepth,
    /// OA101: path strings should be kebab-case.
    PathKebabCase,
    /// OA102: operationId values must be unique across the workspace.
    OperationIdUnique,
    /// OA103: operations must declare the required response codes.
    OperationResponses,
    /// OA104: documents must contain only ASCII characters.
    DocumentAscii,
    /// OA201: a validation-group schema mismatch.
    ValidationGroup,
    /// OA900: a rule implementation failed.
    RuleInternalError,
}

impl DiagnosticCode {
    /// The stable code string.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::ParseError => "OA001",
            DiagnosticCode::UnresolvedRef => "OA002",
            DiagnosticCode::RefCycle => "OA003",
            DiagnosticCode::RefChainDepth => "OA004",
            DiagnosticCode::PathKebabCase => "OA101",
            DiagnosticCode::OperationIdUnique => "OA102",
            DiagnosticCode::OperationResponses => "OA103",
            DiagnosticCode::DocumentAscii => "OA104",
            DiagnosticCode::ValidationGroup => "OA201",
            DiagnosticCode::RuleInternalError => "OA900",
        }
    }

    /// Severity the code carries unless configuration overrides it.
    pub fn default_severity(self) -> Severity {
        match self {
            DiagnosticCode::ParseError
            | DiagnosticCode::UnresolvedRef
            | DiagnosticCode::RefCycle
            | DiagnosticCode::RefChainDepth
            | DiagnosticCode::OperationIdUnique
            | DiagnosticCode::OperationResponses
            | DiagnosticCode::DocumentAscii
            | DiagnosticCode::ValidationGroup
            | DiagnosticCode::RuleInternalError => Severity::Error,
            DiagnosticCode::PathKebabCase => Severity::Info,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
