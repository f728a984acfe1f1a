//! OpenAPI version detection and version-dependent tables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Detected OpenAPI version of a document (or of the root that owns a
/// fragment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OasVersion {
    /// Swagger 2.0 (`swagger: "2.0"`).
    V2_0,
    /// OpenAPI 3.0.x.
    V3_0,
    /// OpenAPI 3.1.x.
    V3_1,
    /// OpenAPI 3.2.x.
    V3_2,
    /// Missing or unrecognized version field.
    Unknown,
}

impl OasVersion {
    /// Parse the value of an `openapi` field (`3.x.y`).
    pub fn from_openapi(value: &str) -> Self {
        if value.starts_with("3.0") {
            OasVersion::V3_0
        } else if value.starts_with("3.1") {
            OasVersion::V3_1
        } else if value.starts_with("3.2") {
            OasVersion::V3_2
        } else {
            OasVersion::Unknown
        }
    }

    /// Parse the value of a `swagger` field (`2.0`).
    pub fn from_swagger(value: &str) -> Self {
        if value == "2.0" { OasVersion::V2_0 } else { OasVersion::Unknown }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OasVersion::V2_0 => "2.0",
            OasVersion::V3_0 => "3.0",
            OasVersion::V3_1 => "3.1",
            OasVersion::V3_2 => "3.2",
            OasVersion::Unknown => "unknown",
        }
    }

    /// Webhooks exist from 3.1 on.
    pub fn supports_webhooks(self) -> bool {
        matches!(self, OasVersion::V3_1 | OasVersion::V3_2)
    }
}

impl fmt::Display for OasVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP methods recognized on path items for every version.
pub const HTTP_METHODS_BASE: &[&str] =
    &["get", "put", "post", "delete", "patch", "options", "head", "trace"];

const HTTP_METHODS_32: &[&str] =
    &["get", "put", "post", "delete", "patch", "options", "head", "trace", "query"];

/// HTTP methods recognized on path items for `version`; OpenAPI 3.2 adds
/// `query`.
pub fn http_methods(version: OasVersion) -> &'static [&'static str] {
    match version {
        OasVersion::V3_2 => HTTP_METHODS_32,
        _ => HTTP_METHODS_BASE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_openapi() {
        assert_eq!(OasVersion::from_openapi("3.0.3"), OasVersion::V3_0);
        assert_eq!(OasVersion::from_openapi("3.1.0"), OasVersion::V3_1);
        assert_eq!(OasVersion::from_openapi("3.2.0"), OasVersion::V3_2);
        assert_eq!(OasVersion::from_openapi("4.0.0"), OasVersion::Unknown);
    }

    #[test]
    fn test_from_swagger() {
        assert_eq!(OasVersion::from_swagger("2.0"), OasVersion::V2_0);
        assert_eq!(OasVersion::from_swagger("1.2"), OasVersion::Unknown);
    }

    #[test]
    fn test_query_method_gated_to_32() {
        assert!(!http_methods(OasVersion::V3_1).contains(&"query"));
        assert!(http_methods(OasVersion::V3_2).contains(&"query"));
        assert_eq!(http_methods(OasVersion::V2_0).len(), 8);
    }

    #[test]
    fn test_webhook_support() {
        assert!(!OasVersion::V3_0.supports_webhooks());
        assert!(OasVersion::V3_1.supports_webhooks());
        assert!(OasVersion::V3_2.supports_webhooks());
    }
}
