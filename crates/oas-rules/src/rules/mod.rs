//! Rule and visitor traits plus the built-in rule set.

mod document_ascii;
mod operation_responses;
mod operationid_unique;
mod path_kebab_case;
mod ref_chain_depth;
mod ref_cycle;
mod unresolved_ref;

pub use document_ascii::DocumentAscii;
pub use operation_responses::OperationResponses;
pub use operationid_unique::OperationIdUnique;
pub use path_kebab_case::PathKebabCase;
pub use ref_chain_depth::RefChainDepth;
pub use ref_cycle::RefCycle;
pub use unresolved_ref::UnresolvedRef;

use crate::context::RuleContext;
use crate::meta::RuleMeta;
use oas_ir::Document;
use oas_workspace_index::{
    CallbackRef, ComponentRef, HeaderRef, LinkRef, MediaTypeRef, OperationRef, ParameterRef,
    PathRef, RefNodeRef, RequestBodyRef, ResponseRef, SchemaRef, SecuritySchemeRef, ServerRef,
    TagRef, WebhookRef,
};
use std::sync::Arc;
use thiserror::Error;

/// A rule implementation failure. The engine turns it into a single
/// `rule-internal-error` diagnostic and keeps running other rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct RuleError(pub String);

impl RuleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type RuleResult = Result<(), RuleError>;

/// Callbacks a rule subscribes to. Every method defaults to a no-op; the
/// engine invokes them in a fixed element order per document. Visitors
/// may keep per-document state; a fresh visitor is created per document.
#[allow(unused_variables)]
pub trait RuleVisitor {
    fn check_document(&mut self, ctx: &mut RuleContext<'_>, doc: &Arc<Document>) -> RuleResult {
        Ok(())
    }
    fn check_root(&mut self, ctx: &mut RuleContext<'_>, doc: &Arc<Document>) -> RuleResult {
        Ok(())
    }
    fn check_tag(&mut self, ctx: &mut RuleContext<'_>, tag: &TagRef) -> RuleResult {
        Ok(())
    }
    fn check_server(&mut self, ctx: &mut RuleContext<'_>, server: &ServerRef) -> RuleResult {
        Ok(())
    }
    fn check_security_scheme(
        &mut self,
        ctx: &mut RuleContext<'_>,
        scheme: &SecuritySchemeRef,
    ) -> RuleResult {
        Ok(())
    }
    fn check_path_item(&mut self, ctx: &mut RuleContext<'_>, path: &PathRef) -> RuleResult {
        Ok(())
    }
    fn check_operation(&mut self, ctx: &mut RuleContext<'_>, op: &OperationRef) -> RuleResult {
        Ok(())
    }
    fn check_parameter(&mut self, ctx: &mut RuleContext<'_>, param: &ParameterRef) -> RuleResult {
        Ok(())
    }
    fn check_request_body(
        &mut self,
        ctx: &mut RuleContext<'_>,
        body: &RequestBodyRef,
    ) -> RuleResult {
        Ok(())
    }
    fn check_response(&mut self, ctx: &mut RuleContext<'_>, response: &ResponseRef) -> RuleResult {
        Ok(())
    }
    fn check_media_type(&mut self, ctx: &mut RuleContext<'_>, mt: &MediaTypeRef) -> RuleResult {
        Ok(())
    }
    fn check_header(&mut self, ctx: &mut RuleContext<'_>, header: &HeaderRef) -> RuleResult {
        Ok(())
    }
    fn check_link(&mut self, ctx: &mut RuleContext<'_>, link: &LinkRef) -> RuleResult {
        Ok(())
    }
    fn check_callback(&mut self, ctx: &mut RuleContext<'_>, callback: &CallbackRef) -> RuleResult {
        Ok(())
    }
    fn check_schema(&mut self, ctx: &mut RuleContext<'_>, schema: &SchemaRef) -> RuleResult {
        Ok(())
    }
    fn check_reference(&mut self, ctx: &mut RuleContext<'_>, reference: &RefNodeRef) -> RuleResult {
        Ok(())
    }
    fn check_webhook(&mut self, ctx: &mut RuleContext<'_>, webhook: &WebhookRef) -> RuleResult {
        Ok(())
    }
    fn check_component(
        &mut self,
        ctx: &mut RuleContext<'_>,
        component: &ComponentRef,
    ) -> RuleResult {
        Ok(())
    }
}

/// A compiled rule: static metadata plus a visitor factory. Rules hold no
/// state between documents.
pub trait Rule: Send + Sync {
    fn meta(&self) -> &RuleMeta;
    fn create(&self) -> Box<dyn RuleVisitor>;
}

/// The built-in rule set, in rule-number order.
pub fn builtin_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(UnresolvedRef),
        Arc::new(RefCycle),
        Arc::new(RefChainDepth),
        Arc::new(PathKebabCase),
        Arc::new(OperationIdUnique),
        Arc::new(OperationResponses),
        Arc::new(DocumentAscii),
    ]
}
