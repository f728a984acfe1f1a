//! Workspace symbol search.

use crate::util::location_of;
use oas_position_tracking::WireLocation;
use oas_workspace_index::Project;
use serde::Serialize;

/// One workspace symbol: a component, an operation, or a path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolInfo {
    pub name: String,
    /// Components section, `operation`, or `path`.
    pub container: String,
    pub location: WireLocation,
}

/// Case-insensitive substring search over component names, operationIds,
/// and path strings. An empty query returns everything.
pub fn workspace_symbols(project: &Project, query: &str) -> Vec<SymbolInfo> {
    let needle = query.to_ascii_lowercase();
    let matches = |name: &str| needle.is_empty() || name.to_ascii_lowercase().contains(&needle);
    let mut out = Vec::new();

    for component in &project.index().components {
        if matches(&component.name) {
            if let Some(location) =
                location_of(project, &component.element.uri, &component.element.pointer)
            {
                out.push(SymbolInfo {
                    name: component.name.clone(),
                    container: component.section.clone(),
                    location,
                });
            }
        }
    }
    for op in &project.index().operations {
        let Some(id) = &op.operation_id else { continue };
        if matches(id) {
            if let Some(location) = location_of(project, &op.element.uri, &op.element.pointer) {
                out.push(SymbolInfo {
                    name: id.clone(),
                    container: "operation".to_string(),
                    location,
                });
            }
        }
    }
    for path in &project.index().paths {
        if matches(&path.path) {
            if let Some(location) = location_of(
                project,
                &path.element.reference_uri,
                &path.element.reference_pointer,
            ) {
                out.push(SymbolInfo {
                    name: path.path.clone(),
                    container: "path".to_string(),
                    location,
                });
            }
        }
    }
    out
}
