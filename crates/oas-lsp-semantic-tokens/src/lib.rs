//! Semantic token generation for OpenAPI documents.
//!
//! Tokens are collected as absolute `(line, character, length, type,
//! modifiers)` tuples from the IR, sorted, then delta-encoded into the
//! LSP wire layout `[deltaLine, deltaStart, length, tokenType, tokenMods]`.

use oas_ir::{IrKind, IrNode};
use oas_position_tracking::{ByteSpan, SourceMap};
use oas_uri::split_pointer;
use oas_workspace_index::Project;

/// LSP wire layout for one token.
pub type EncodedToken = [u32; 5];

/// Token type indices, stable against [`legend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TokenType {
    HttpMethod = 0,
    Path = 1,
    StatusCode = 2,
    Reference = 3,
    OperationId = 4,
    TypeName = 5,
    Property = 6,
    Namespace = 7,
    Parameter = 8,
    SchemaName = 9,
}

/// Bit for the `deprecated` modifier.
pub const MOD_DEPRECATED: u32 = 1;

/// The legend clients register against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokensLegend {
    pub token_types: Vec<&'static str>,
    pub modifiers: Vec<&'static str>,
}

pub fn legend() -> TokensLegend {
    TokensLegend {
        token_types: vec![
            "httpMethod",
            "path",
            "statusCode",
            "reference",
            "operationId",
            "type",
            "property",
            "namespace",
            "parameter",
            "schemaName",
        ],
        modifiers: vec!["deprecated"],
    }
}

/// One absolute token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticToken {
    pub line: u32,
    pub character: u32,
    pub length: u32,
    pub token_type: TokenType,
    pub modifiers: u32,
}

/// Collect absolute tokens for one document, sorted by position.
pub fn collect_semantic_tokens(project: &Project, uri: &str) -> Vec<SemanticToken> {
    let Some(doc) = project.document(uri) else { return Vec::new() };
    let Some(root) = doc.root() else { return Vec::new() };
    let mut sink = Sink { map: &doc.source_map, tokens: Vec::new() };

    if let Some(paths) = root.child("paths") {
        for (path, item) in paths.entries() {
            sink.path_key(path, item);
            sink.path_item(item);
        }
    }
    if let Some(webhooks) = root.child("webhooks") {
        for (name, item) in webhooks.entries() {
            sink.path_key(name, item);
            sink.path_item(item);
        }
    }
    if let Some(components) = root.child("components") {
        for (_, section) in components.entries() {
            sink.key_token(section, TokenType::Namespace, 0);
        }
        if let Some(schemas) = components.child("schemas") {
            for (_, schema) in schemas.entries() {
                sink.key_token(schema, TokenType::SchemaName, 0);
            }
        }
    }
    sink.scan(root);

    let mut tokens = sink.tokens;
    tokens.sort_by_key(|t| (t.line, t.character));
    tokens.dedup();
    tokens
}

/// Delta-encode sorted tokens into the LSP stream.
pub fn encode(tokens: &[SemanticToken]) -> Vec<EncodedToken> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut prev_line = 0u32;
    let mut prev_char = 0u32;
    for token in tokens {
        let delta_line = token.line - prev_line;
        let delta_char =
            if delta_line == 0 { token.character - prev_char } else { token.character };
        out.push([delta_line, delta_char, token.length, token.token_type as u32, token.modifiers]);
        prev_line = token.line;
        prev_char = token.character;
    }
    out
}

const METHODS: &[&str] =
    &["get", "put", "post", "delete", "patch", "options", "head", "trace", "query"];

struct Sink<'a> {
    map: &'a SourceMap,
    tokens: Vec<SemanticToken>,
}

impl Sink<'_> {
    fn push_span(&mut self, span: ByteSpan, token_type: TokenType, modifiers: u32) {
        let start = self.map.offset_to_position(span.start);
        let end = self.map.offset_to_position(span.end);
        // Tokens are single-line by construction; skip anything that is not.
        if start.line != end.line || end.character <= start.character {
            return;
        }
        self.tokens.push(SemanticToken {
            line: start.line,
            character: start.character,
            length: end.character - start.character,
            token_type,
            modifiers,
        });
    }

    fn key_token(&mut self, node: &IrNode, token_type: TokenType, modifiers: u32) {
        if let Some(span) = node.loc.key_span() {
            self.push_span(span, token_type, modifiers);
        }
    }

    fn value_token(&mut self, node: &IrNode, token_type: TokenType, modifiers: u32) {
        if let Some(span) = node.loc.value_span() {
            self.push_span(span, token_type, modifiers);
        }
    }

    /// Path key, split into path chunks and `{template}` parameters.
    fn path_key(&mut self, path: &str, item: &IrNode) {
        let Some(key_span) = item.loc.key_span() else { return };
        // The key token may be quoted; align chunk offsets to where the
        // path text actually starts inside the token.
        let skip = usize::from(key_span.len() > path.len());
        let base = key_span.start + skip;
        let mut chunk_start = 0usize;
        let bytes = path.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'{' {
                if chunk_start < i {
                    self.push_span(
                        ByteSpan::new(base + chunk_start, base + i),
                        TokenType::Path,
                        0,
                    );
                }
                let close = path[i..].find('}').map(|c| i + c + 1).unwrap_or(path.len());
                self.push_span(ByteSpan::new(base + i, base + close), TokenType::Parameter, 0);
                chunk_start = close;
                i = close;
            } else {
                i += 1;
            }
        }
        if chunk_start < path.len() {
            self.push_span(
                ByteSpan::new(base + chunk_start, base + path.len()),
                TokenType::Path,
                0,
            );
        }
    }

    fn path_item(&mut self, item: &IrNode) {
        for (key, op) in item.entries() {
            if !METHODS.contains(&key) {
                continue;
            }
            self.key_token(op, TokenType::HttpMethod, 0);
            if let Some(responses) = op.child("responses") {
                for (_, response) in responses.entries() {
                    self.key_token(response, TokenType::StatusCode, 0);
                }
            }
        }
    }

    /// Document-wide scan: `$ref` values, `operationId` values, `type`
    /// values, `deprecated` keys.
    fn scan(&mut self, node: &IrNode) {
        match node.key.as_deref() {
            Some("$ref") if node.as_str().is_some() => {
                self.value_token(node, TokenType::Reference, 0);
            }
            Some("operationId") if node.as_str().is_some() => {
                self.value_token(node, TokenType::OperationId, 0);
            }
            Some("type") if node.as_str().is_some() => {
                self.value_token(node, TokenType::TypeName, 0);
            }
            Some("deprecated") if node.kind == IrKind::Boolean => {
                // Only the OpenAPI `deprecated` flag, not a property named
                // "deprecated" inside a schema's properties map.
                let segments = split_pointer(&node.ptr);
                if segments.len() < 2 || segments[segments.len() - 2] != "properties" {
                    self.key_token(node, TokenType::Property, MOD_DEPRECATED);
                }
            }
            _ => {}
        }
        for child in &node.children {
            self.scan(child);
        }
    }
}
