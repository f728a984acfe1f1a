//! Cross-document `$ref` graph, resolver, and root resolution.

mod graph;
mod provider;
mod resolver;
mod roots;

pub use graph::{GraphNode, RefEdge, RefGraph};
pub use provider::{DocumentProvider, DocumentSet};
pub use resolver::{MAX_REF_CHAIN, Resolved, Resolver, UnresolvedRefError};
pub use roots::RootResolver;
