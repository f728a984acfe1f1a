//! Location-carrying IR and document model for OpenAPI analysis.

mod document;
mod node;
mod version;

pub use document::{Document, DocumentKind, ParseIssue};
pub use node::{IrKind, IrNode, NodeLoc, ScalarValue};
pub use version::{HTTP_METHODS_BASE, OasVersion, http_methods};
