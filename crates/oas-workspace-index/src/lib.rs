//! Workspace-wide element indexing for OpenAPI analysis.
//!
//! Core component in the Load → Graph → Index → Check pipeline: after the
//! loader produces located IRs and the graph wires up `$ref` edges, the
//! indexer walks every document once and records every OpenAPI element
//! with stable `uri#pointer` identity. Rule engines and LSP providers
//! consume the typed maps; nothing here mutates documents.

mod cancel;
mod document_store;
mod operation_ids;
mod project;
mod records;
mod scope;
mod walker;

pub use cancel::CancelToken;
pub use document_store::DocumentStore;
pub use operation_ids::{OperationIdIndex, OperationIdOccurrence};
pub use project::Project;
pub use records::{
    CallbackRef, ComponentRef, ElementMap, ElementRef, ExampleRef, HeaderRef, LinkRef,
    MediaTypeRef, OperationRef, ParameterLevel, ParameterRef, PathRef, ProjectIndex, RefNodeRef,
    RequestBodyRef, ResponseRef, SchemaRef, SecurityLevel, SecurityRef, SecuritySchemeRef,
    ServerRef, TagRef, WebhookRef,
};
pub use scope::ScopeContext;
