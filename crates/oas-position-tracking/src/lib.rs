//! Byte-offset position tracking for OpenAPI documents.
//!
//! The analyzer works in byte offsets end to end: the YAML/JSON loader
//! records byte ranges for every node, the reference graph and index key
//! on them, and only the LSP boundary converts to 0-based line / UTF-16
//! character positions. This crate owns that conversion.

mod source_map;
mod span;
mod wire;

pub use source_map::SourceMap;
pub use span::ByteSpan;
pub use wire::{WireLocation, WirePosition, WireRange};
