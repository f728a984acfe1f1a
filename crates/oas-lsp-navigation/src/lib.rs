//! Symbolic navigation features for OpenAPI workspaces.

mod code_lens;
mod document_links;
mod goto;
mod hierarchy;
mod references;
mod symbols;
mod util;

pub use code_lens::{CodeLens, code_lenses};
pub use document_links::{DocumentLink, document_links};
pub use goto::goto_definition;
pub use hierarchy::{CallHierarchy, HierarchyItem, call_hierarchy};
pub use references::find_references;
pub use symbols::{SymbolInfo, workspace_symbols};
pub use util::location_of;
