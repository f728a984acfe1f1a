//! Location-preserving document loader for OpenAPI workspaces.
//!
//! `load_document` turns raw YAML/JSON/JSONC text into an [`oas_ir::Document`]
//! whose every IR node carries exact byte offsets, then classifies the
//! document kind and detects the declared OpenAPI version. Parse failures
//! produce an empty-IR document with attached issues; downstream stages
//! tolerate empty IRs, so one broken file never poisons a workspace run.

mod builder;
mod jsonc;
mod loader;

pub use jsonc::blank_comments;
pub use loader::{identify_document_kind, load_document, load_document_with_mtime};
