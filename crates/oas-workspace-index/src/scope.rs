//! Scope context derived from pointer segments.

use oas_uri::split_pointer;
use serde::Serialize;

const METHODS: &[&str] =
    &["get", "put", "post", "delete", "patch", "options", "head", "trace", "query"];

/// The enclosing path/operation/parameter/security/component of a
/// location, computed purely from its pointer segments. Consumers that
/// need context (security-scheme navigation, completion hosts) read this
/// instead of re-walking the IR.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScopeContext {
    /// Path string under `paths`, or webhook name under `webhooks`.
    pub path: Option<String>,
    /// Lowercase HTTP method when inside an operation.
    pub operation: Option<String>,
    /// Index into the nearest `parameters` list.
    pub parameter_index: Option<usize>,
    /// Index into the nearest `security` list.
    pub security_index: Option<usize>,
    /// `(section, name)` when inside `components`.
    pub component: Option<(String, String)>,
}

impl ScopeContext {
    /// Context for a canonical fragment pointer. The root pointer has no
    /// scope.
    pub fn from_pointer(pointer: &str) -> Option<ScopeContext> {
        let segments = split_pointer(pointer);
        if segments.is_empty() {
            return None;
        }
        let mut scope = ScopeContext::default();

        if (segments[0] == "paths" || segments[0] == "webhooks") && segments.len() > 1 {
            scope.path = Some(segments[1].clone());
            if segments.len() > 2 && METHODS.contains(&segments[2].as_str()) {
                scope.operation = Some(segments[2].clone());
            }
        }
        if segments[0] == "components" && segments.len() > 2 {
            scope.component = Some((segments[1].clone(), segments[2].clone()));
        }
        for (i, segment) in segments.iter().enumerate() {
            if i + 1 >= segments.len() {
                break;
            }
            let index = segments[i + 1].parse::<usize>().ok();
            match segment.as_str() {
                "parameters" => scope.parameter_index = index,
                "security" => scope.security_index = index,
                _ => {}
            }
        }
        Some(scope)
    }
}
