//! The single-pass document walk that populates the project index.

use crate::cancel::CancelToken;
use crate::operation_ids::{OperationIdIndex, OperationIdOccurrence};
use crate::records::*;
use oas_graph::{DocumentProvider, RefGraph, Resolver, RootResolver};
use oas_ir::{Document, DocumentKind, IrKind, IrNode, OasVersion, http_methods};
use rustc_hash::FxHashSet;
use tracing::debug;

/// Component sections of an OpenAPI 3.x document.
const COMPONENT_SECTIONS: &[&str] = &[
    "schemas",
    "responses",
    "parameters",
    "headers",
    "examples",
    "requestBodies",
    "securitySchemes",
    "links",
    "callbacks",
];

/// Walk every document once and build the typed element maps plus the
/// operationId occurrence index. Checks the token between documents and
/// returns whatever was indexed so far when cancelled.
pub(crate) fn build_index(
    provider: &dyn DocumentProvider,
    graph: &RefGraph,
    token: &CancelToken,
) -> (ProjectIndex, OperationIdIndex) {
    let mut index = ProjectIndex::default();
    let mut op_ids = OperationIdIndex::default();
    let roots = RootResolver::new(graph, provider);

    for uri in provider.document_uris() {
        if token.is_cancelled() {
            break;
        }
        let Some(doc) = provider.document(&uri) else { continue };
        let version = if doc.is_root() {
            doc.version
        } else {
            roots.version_for_partial(&uri).unwrap_or(OasVersion::Unknown)
        };
        let mut walker = IndexWalker {
            provider,
            resolver: Resolver::new(provider),
            index: &mut index,
            op_ids: &mut op_ids,
            version,
        };
        walker.walk_document(&doc);
    }
    debug!(
        operations = index.operations.len(),
        schemas = index.schemas.len(),
        refs = index.refs.len(),
        "project index built"
    );
    (index, op_ids)
}

struct IndexWalker<'a> {
    provider: &'a dyn DocumentProvider,
    resolver: Resolver<'a>,
    index: &'a mut ProjectIndex,
    op_ids: &'a mut OperationIdIndex,
    version: OasVersion,
}

impl IndexWalker<'_> {
    fn walk_document(&mut self, doc: &Document) {
        let Some(root) = doc.root() else { return };
        self.collect_ref_nodes(&doc.uri, root);

        // Fragment files holding a components object (shared schema
        // libraries) get the full components walk too; the root walk does
        // its own.
        if doc.kind != DocumentKind::Root {
            if let Some(components) = root.child("components") {
                self.walk_components(&doc.uri, components);
            }
        }

        match doc.kind {
            DocumentKind::Root => self.walk_root(&doc.uri, root),
            DocumentKind::PathItem => {
                let owner = ElementRef::direct(&doc.uri, "#");
                self.walk_path_item(&doc.uri, root, None, owner.key(), false);
            }
            DocumentKind::Parameter => self.walk_parameter(&doc.uri, root, ParameterLevel::Standalone),
            DocumentKind::Response => {
                let element = ElementRef::direct(&doc.uri, "#");
                self.index
                    .responses
                    .insert(element.key(), ResponseRef { status: None, element });
                self.walk_response_body(&doc.uri, root);
            }
            DocumentKind::RequestBody => {
                let element = ElementRef::direct(&doc.uri, "#");
                self.index.request_bodies.insert(element.key(), RequestBodyRef { element });
                if let Some(content) = root.child("content") {
                    self.walk_content(&doc.uri, content);
                }
            }
            DocumentKind::Example => {
                let element = ElementRef::direct(&doc.uri, "#");
                self.index.examples.insert(element.key(), ExampleRef { name: None, element });
            }
            // Ambiguous fragments are treated as generic schema fragments.
            DocumentKind::Schema | DocumentKind::Unknown => {
                self.walk_schema(&doc.uri, root, 0, None, None, false);
            }
        }
    }

    /// Record every `$ref` node. A `$ref` is a boundary: collection never
    /// descends past one.
    fn collect_ref_nodes(&mut self, uri: &str, node: &IrNode) {
        if let Some(ref_string) = node.ref_string() {
            let element = ElementRef::direct(uri, node.ptr.clone());
            self.index.refs.insert(
                element.key(),
                RefNodeRef { ref_string: ref_string.to_string(), element },
            );
            return;
        }
        for child in &node.children {
            self.collect_ref_nodes(uri, child);
        }
    }

    fn walk_root(&mut self, uri: &str, root: &IrNode) {
        if let Some(security) = root.child("security") {
            self.walk_security(uri, security, SecurityLevel::Root);
        }
        if let Some(tags) = root.child("tags") {
            for tag in tags.items() {
                let element = ElementRef::direct(uri, tag.ptr.clone());
                self.index.tags.insert(
                    element.key(),
                    TagRef { name: tag.child_str("name").map(String::from), element },
                );
            }
        }
        if let Some(servers) = root.child("servers") {
            for server in servers.items() {
                let element = ElementRef::direct(uri, server.ptr.clone());
                self.index.servers.insert(
                    element.key(),
                    ServerRef { url: server.child_str("url").map(String::from), element },
                );
            }
        }
        if let Some(paths) = root.child("paths") {
            for (path, item) in paths.entries() {
                self.walk_path_entry(uri, path, item, false);
            }
        }
        if self.version.supports_webhooks() {
            if let Some(webhooks) = root.child("webhooks") {
                for (name, item) in webhooks.entries() {
                    self.walk_path_entry(uri, name, item, true);
                }
            }
        }
        if let Some(components) = root.child("components") {
            self.walk_components(uri, components);
        }
    }

    /// One `paths` (or `webhooks`) entry: register the path item, chase a
    /// path-item-level `$ref`, then walk the definition.
    fn walk_path_entry(&mut self, uri: &str, name: &str, item: &IrNode, webhook: bool) {
        let element = self.deref_element(uri, item);
        let owner_key = element.key();
        if webhook {
            self.index.webhooks.insert(
                owner_key.clone(),
                WebhookRef { name: name.to_string(), element: element.clone() },
            );
        } else {
            self.index.paths.insert(
                owner_key.clone(),
                PathRef { path: name.to_string(), element: element.clone() },
            );
        }
        let path = (!webhook).then(|| name.to_string());
        self.with_definition(&element, uri, item, |walker, def_uri, def_node| {
            walker.walk_path_item(def_uri, def_node, path.as_deref(), owner_key, webhook);
        });
    }

    fn walk_path_item(
        &mut self,
        uri: &str,
        node: &IrNode,
        path: Option<&str>,
        owner_key: String,
        webhook: bool,
    ) {
        if let Some(parameters) = node.child("parameters") {
            for parameter in parameters.items() {
                self.walk_parameter(uri, parameter, ParameterLevel::Path);
            }
        }
        for method in http_methods(self.version) {
            let Some(op_node) = node.child(method) else { continue };
            if op_node.kind != IrKind::Object {
                continue;
            }
            let element = self.deref_element(uri, op_node);
            let op_key = element.key();
            self.with_definition(&element, uri, op_node, |walker, def_uri, def_node| {
                let operation_id = def_node.child_str("operationId").map(String::from);
                if let Some(id) = &operation_id {
                    if let Some(id_node) = def_node.child("operationId") {
                        walker.op_ids.record(id, OperationIdOccurrence {
                            uri: def_uri.to_string(),
                            pointer: id_node.ptr.clone(),
                        });
                    }
                }
                walker.index.operations.insert(op_key.clone(), OperationRef {
                    method: (*method).to_string(),
                    path: path.map(String::from),
                    operation_id,
                    owner_key: owner_key.clone(),
                    is_webhook: webhook,
                    element: element.clone(),
                });
                walker
                    .index
                    .operations_by_owner
                    .entry(owner_key.clone())
                    .or_default()
                    .push(op_key.clone());
                walker.walk_operation(def_uri, def_node);
            });
        }
    }

    fn walk_operation(&mut self, uri: &str, node: &IrNode) {
        if let Some(security) = node.child("security") {
            self.walk_security(uri, security, SecurityLevel::Operation);
        }
        if let Some(parameters) = node.child("parameters") {
            for parameter in parameters.items() {
                self.walk_parameter(uri, parameter, ParameterLevel::Operation);
            }
        }
        if let Some(request_body) = node.child("requestBody") {
            let element = self.deref_element(uri, request_body);
            self.index
                .request_bodies
                .insert(element.key(), RequestBodyRef { element: element.clone() });
            self.with_definition(&element, uri, request_body, |walker, def_uri, def_node| {
                if let Some(content) = def_node.child("content") {
                    walker.walk_content(def_uri, content);
                }
            });
        }
        if let Some(responses) = node.child("responses") {
            for (status, response) in responses.entries() {
                let element = self.deref_element(uri, response);
                self.index.responses.insert(
                    element.key(),
                    ResponseRef { status: Some(status.to_string()), element: element.clone() },
                );
                self.with_definition(&element, uri, response, |walker, def_uri, def_node| {
                    walker.walk_response_body(def_uri, def_node);
                });
            }
        }
        if let Some(callbacks) = node.child("callbacks") {
            for (name, callback) in callbacks.entries() {
                let element = self.deref_element(uri, callback);
                self.index.callbacks.insert(
                    element.key(),
                    CallbackRef { name: name.to_string(), element: element.clone() },
                );
                self.with_definition(&element, uri, callback, |walker, def_uri, def_node| {
                    walker.walk_callback(def_uri, def_node);
                });
            }
        }
    }

    /// Callback expressions are path items.
    fn walk_callback(&mut self, uri: &str, node: &IrNode) {
        for (_, item) in node.entries() {
            let owner = ElementRef::direct(uri, item.ptr.clone());
            self.walk_path_item(uri, item, None, owner.key(), false);
        }
    }

    fn walk_security(&mut self, uri: &str, node: &IrNode, level: SecurityLevel) {
        for requirement in node.items() {
            let schemes = requirement.entries().map(|(k, _)| k.to_string()).collect();
            let element = ElementRef::direct(uri, requirement.ptr.clone());
            self.index
                .security
                .insert(element.key(), SecurityRef { level, schemes, element });
        }
    }

    fn walk_parameter(&mut self, uri: &str, node: &IrNode, level: ParameterLevel) {
        let element = self.deref_element(uri, node);
        self.with_definition(&element, uri, node, |walker, def_uri, def_node| {
            walker.index.parameters.insert(element.key(), ParameterRef {
                name: def_node.child_str("name").map(String::from),
                location: def_node.child_str("in").map(String::from),
                level,
                element: element.clone(),
            });
            if let Some(schema) = def_node.child("schema") {
                walker.walk_schema(def_uri, schema, 0, None, None, false);
            }
            walker.walk_named_examples(def_uri, def_node);
        });
    }

    fn walk_response_body(&mut self, uri: &str, node: &IrNode) {
        if let Some(headers) = node.child("headers") {
            for (name, header) in headers.entries() {
                let element = self.deref_element(uri, header);
                self.index.headers.insert(
                    element.key(),
                    HeaderRef { name: name.to_string(), element: element.clone() },
                );
                self.with_definition(&element, uri, header, |walker, def_uri, def_node| {
                    if let Some(schema) = def_node.child("schema") {
                        walker.walk_schema(def_uri, schema, 0, None, None, false);
                    }
                    walker.walk_named_examples(def_uri, def_node);
                });
            }
        }
        if let Some(content) = node.child("content") {
            self.walk_content(uri, content);
        }
        if let Some(links) = node.child("links") {
            for (name, link) in links.entries() {
                let element = self.deref_element(uri, link);
                self.index.links.insert(
                    element.key(),
                    LinkRef { name: Some(name.to_string()), element },
                );
            }
        }
    }

    fn walk_content(&mut self, uri: &str, node: &IrNode) {
        for (media_type, mt_node) in node.entries() {
            let element = ElementRef::direct(uri, mt_node.ptr.clone());
            self.index.media_types.insert(
                element.key(),
                MediaTypeRef { media_type: media_type.to_string(), element },
            );
            if let Some(schema) = mt_node.child("schema") {
                self.walk_schema(uri, schema, 0, None, None, false);
            }
            self.walk_named_examples(uri, mt_node);
        }
    }

    fn walk_named_examples(&mut self, uri: &str, node: &IrNode) {
        let Some(examples) = node.child("examples") else { return };
        for (name, example) in examples.entries() {
            let element = self.deref_element(uri, example);
            self.index
                .examples
                .insert(element.key(), ExampleRef { name: Some(name.to_string()), element });
        }
    }

    /// Register a schema and recurse through its nested schemas. A schema
    /// that is itself a `$ref` is registered and then treated as a
    /// boundary; its target is indexed where it is defined.
    fn walk_schema(
        &mut self,
        uri: &str,
        node: &IrNode,
        depth: usize,
        parent_pointer: Option<&str>,
        property_name: Option<&str>,
        required: bool,
    ) {
        let element = ElementRef::direct(uri, node.ptr.clone());
        self.index.schemas.insert(element.key(), SchemaRef {
            depth,
            parent_pointer: parent_pointer.map(String::from),
            property_name: property_name.map(String::from),
            required,
            element,
        });
        if node.ref_string().is_some() || node.kind != IrKind::Object {
            return;
        }

        let required_set: FxHashSet<&str> = node
            .child("required")
            .map(|r| r.items().filter_map(IrNode::as_str).collect())
            .unwrap_or_default();

        if let Some(properties) = node.child("properties") {
            for (name, prop) in properties.entries() {
                self.walk_schema(
                    uri,
                    prop,
                    depth + 1,
                    Some(&node.ptr),
                    Some(name),
                    required_set.contains(name),
                );
            }
        }
        for keyword in ["items", "additionalProperties", "not"] {
            if let Some(child) = node.child(keyword) {
                if child.kind == IrKind::Object {
                    self.walk_schema(uri, child, depth + 1, Some(&node.ptr), None, false);
                }
            }
        }
        for keyword in ["prefixItems", "allOf", "oneOf", "anyOf"] {
            if let Some(list) = node.child(keyword) {
                for item in list.items() {
                    self.walk_schema(uri, item, depth + 1, Some(&node.ptr), None, false);
                }
            }
        }
    }

    fn walk_components(&mut self, uri: &str, node: &IrNode) {
        for section in COMPONENT_SECTIONS {
            let Some(section_node) = node.child(section) else { continue };
            for (name, entry) in section_node.entries() {
                let component_el = ElementRef::direct(uri, entry.ptr.clone());
                self.index.components.insert(
                    component_el.key(),
                    ComponentRef {
                        section: (*section).to_string(),
                        name: name.to_string(),
                        element: component_el,
                    },
                );
                match *section {
                    "schemas" => self.walk_schema(uri, entry, 0, None, None, false),
                    "responses" => {
                        let element = self.deref_element(uri, entry);
                        self.index.responses.insert(
                            element.key(),
                            ResponseRef { status: None, element: element.clone() },
                        );
                        self.with_definition(&element, uri, entry, |walker, def_uri, def_node| {
                            walker.walk_response_body(def_uri, def_node);
                        });
                    }
                    "parameters" => self.walk_parameter(uri, entry, ParameterLevel::Component),
                    "headers" => {
                        let element = self.deref_element(uri, entry);
                        self.index.headers.insert(
                            element.key(),
                            HeaderRef { name: name.to_string(), element: element.clone() },
                        );
                        self.with_definition(&element, uri, entry, |walker, def_uri, def_node| {
                            if let Some(schema) = def_node.child("schema") {
                                walker.walk_schema(def_uri, schema, 0, None, None, false);
                            }
                            walker.walk_named_examples(def_uri, def_node);
                        });
                    }
                    "examples" => {
                        let element = self.deref_element(uri, entry);
                        self.index.examples.insert(
                            element.key(),
                            ExampleRef { name: Some(name.to_string()), element },
                        );
                    }
                    "requestBodies" => {
                        let element = self.deref_element(uri, entry);
                        self.index
                            .request_bodies
                            .insert(element.key(), RequestBodyRef { element: element.clone() });
                        self.with_definition(&element, uri, entry, |walker, def_uri, def_node| {
                            if let Some(content) = def_node.child("content") {
                                walker.walk_content(def_uri, content);
                            }
                        });
                    }
                    "securitySchemes" => {
                        let element = ElementRef::direct(uri, entry.ptr.clone());
                        self.index.security_schemes.insert(
                            element.key(),
                            SecuritySchemeRef { name: name.to_string(), element },
                        );
                    }
                    "links" => {
                        let element = self.deref_element(uri, entry);
                        self.index.links.insert(
                            element.key(),
                            LinkRef { name: Some(name.to_string()), element },
                        );
                    }
                    "callbacks" => {
                        let element = self.deref_element(uri, entry);
                        self.index.callbacks.insert(
                            element.key(),
                            CallbackRef { name: name.to_string(), element: element.clone() },
                        );
                        self.with_definition(&element, uri, entry, |walker, def_uri, def_node| {
                            walker.walk_callback(def_uri, def_node);
                        });
                    }
                    _ => {}
                }
            }
        }
    }

    /// Reference-aware element location: follows a `$ref` chain to the
    /// definition when the node has one, falling back to the node itself
    /// when resolution fails.
    fn deref_element(&self, uri: &str, node: &IrNode) -> ElementRef {
        match node.ref_string() {
            Some(ref_string) => match self.resolver.follow(uri, ref_string) {
                Ok(resolved) => ElementRef::referenced(
                    resolved.origin.uri,
                    resolved.origin.pointer,
                    uri,
                    node.ptr.clone(),
                ),
                Err(_) => ElementRef::direct(uri, node.ptr.clone()),
            },
            None => ElementRef::direct(uri, node.ptr.clone()),
        }
    }

    /// Run `f` on the definition node of `element`: the local node when
    /// there is no indirection, the target document's node otherwise.
    fn with_definition(
        &mut self,
        element: &ElementRef,
        local_uri: &str,
        local_node: &IrNode,
        f: impl FnOnce(&mut Self, &str, &IrNode),
    ) {
        if !element.is_referenced() {
            // A local node that still carries `$ref` failed to resolve;
            // there is no definition to walk.
            if local_node.ref_string().is_some() {
                return;
            }
            f(self, local_uri, local_node);
            return;
        }
        let Some(doc) = self.provider.document(&element.uri) else { return };
        if let Some(node) = doc.node_at(&element.pointer) {
            f(self, &element.uri, node);
        }
    }
}
