//! The tagged IR node tree.

use oas_position_tracking::ByteSpan;
use oas_uri::{child_pointer, split_pointer};
use serde::{Deserialize, Serialize};

/// Variant tag of an [`IrNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

impl IrKind {
    /// Lowercase name as it appears in diagnostics (`"object"`, `"string"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            IrKind::Object => "object",
            IrKind::Array => "array",
            IrKind::String => "string",
            IrKind::Number => "number",
            IrKind::Boolean => "boolean",
            IrKind::Null => "null",
        }
    }
}

/// Scalar payload of string/number/boolean/null nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
}

/// Byte locations of a node and, for mapping values, of the key and value
/// tokens separately so features can target either side.
///
/// Invariants: `start <= end`; when the key fields are present,
/// `key_start <= key_end <= val_start <= val_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeLoc {
    pub start: usize,
    pub end: usize,
    pub key_start: Option<usize>,
    pub key_end: Option<usize>,
    pub val_start: Option<usize>,
    pub val_end: Option<usize>,
}

impl NodeLoc {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end, key_start: None, key_end: None, val_start: None, val_end: None }
    }

    /// Span of the whole node.
    pub fn span(&self) -> ByteSpan {
        ByteSpan::new(self.start, self.end)
    }

    /// Span of the key token, when this node is a mapping value.
    pub fn key_span(&self) -> Option<ByteSpan> {
        match (self.key_start, self.key_end) {
            (Some(s), Some(e)) => Some(ByteSpan::new(s, e)),
            _ => None,
        }
    }

    /// Span of the value token, when recorded separately from the key.
    pub fn value_span(&self) -> Option<ByteSpan> {
        match (self.val_start, self.val_end) {
            (Some(s), Some(e)) => Some(ByteSpan::new(s, e)),
            _ => None,
        }
    }
}

/// One node of the parsed document tree.
///
/// Children are ordered as they appear in the source; object children carry
/// their `key`. `ptr` is the node's canonical fragment pointer from the
/// document root (`#` for the root itself).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrNode {
    pub kind: IrKind,
    pub key: Option<String>,
    pub value: Option<ScalarValue>,
    pub children: Vec<IrNode>,
    pub ptr: String,
    pub loc: NodeLoc,
}

impl IrNode {
    /// A scalar node with no key context.
    pub fn scalar(kind: IrKind, value: ScalarValue, ptr: String, loc: NodeLoc) -> Self {
        Self { kind, key: None, value: Some(value), children: Vec::new(), ptr, loc }
    }

    /// A container node (object or array).
    pub fn container(kind: IrKind, ptr: String, loc: NodeLoc) -> Self {
        Self { kind, key: None, value: None, children: Vec::new(), ptr, loc }
    }

    pub fn is_object(&self) -> bool {
        self.kind == IrKind::Object
    }

    pub fn is_array(&self) -> bool {
        self.kind == IrKind::Array
    }

    /// String payload, when this node is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Some(ScalarValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            Some(ScalarValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match &self.value {
            Some(ScalarValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Child of an object by key.
    pub fn child(&self, key: &str) -> Option<&IrNode> {
        if self.kind != IrKind::Object {
            return None;
        }
        self.children.iter().find(|c| c.key.as_deref() == Some(key))
    }

    /// String value of an object child, e.g. `node.child_str("$ref")`.
    pub fn child_str(&self, key: &str) -> Option<&str> {
        self.child(key).and_then(IrNode::as_str)
    }

    /// Ordered `(key, node)` pairs of an object.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &IrNode)> {
        self.children
            .iter()
            .filter(move |_| self.kind == IrKind::Object)
            .filter_map(|c| c.key.as_deref().map(|k| (k, c)))
    }

    /// Ordered items of an array.
    pub fn items(&self) -> impl Iterator<Item = &IrNode> {
        self.children.iter().filter(move |_| self.kind == IrKind::Array)
    }

    /// The `$ref` string when this node is an object with a string `$ref`
    /// member. Such a node is a traversal boundary everywhere in the
    /// analyzer.
    pub fn ref_string(&self) -> Option<&str> {
        self.child_str("$ref")
    }

    /// Resolve a canonical fragment pointer (`#/a/b/0`) relative to this
    /// node. Array segments must parse as indices.
    pub fn get(&self, ptr: &str) -> Option<&IrNode> {
        let mut node = self;
        for segment in split_pointer(ptr) {
            node = match node.kind {
                IrKind::Object => node.child(&segment)?,
                IrKind::Array => {
                    let index: usize = segment.parse().ok()?;
                    node.children.get(index)?
                }
                _ => return None,
            };
        }
        Some(node)
    }

    /// Pre-order depth-first walk over the subtree, root included.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a IrNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// The deepest node whose span contains `offset`, preferring later
    /// (more specific) children on ties.
    pub fn node_at_offset(&self, offset: usize) -> Option<&IrNode> {
        if !self.loc.span().contains(offset) && !(self.ptr == "#" && self.loc.span().is_empty()) {
            return None;
        }
        for child in self.children.iter().rev() {
            if child.loc.span().contains(offset) {
                return child.node_at_offset(offset);
            }
        }
        Some(self)
    }

    /// Pointer of a direct child with the given key, without looking it up.
    pub fn child_ptr(&self, key: &str) -> String {
        child_pointer(&self.ptr, key)
    }

    /// The subtree as plain JSON data (locations and keys stripped).
    /// Duplicate object keys keep the last value, as JSON parsers do.
    pub fn to_plain_json(&self) -> serde_json::Value {
        match self.kind {
            IrKind::Object => {
                let mut map = serde_json::Map::new();
                for (key, child) in self.entries() {
                    map.insert(key.to_string(), child.to_plain_json());
                }
                serde_json::Value::Object(map)
            }
            IrKind::Array => {
                serde_json::Value::Array(self.items().map(IrNode::to_plain_json).collect())
            }
            _ => match &self.value {
                Some(ScalarValue::String(s)) => serde_json::Value::String(s.clone()),
                Some(ScalarValue::Number(n)) => serde_json::Number::from_f64(*n)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
                Some(ScalarValue::Boolean(b)) => serde_json::Value::Bool(*b),
                _ => serde_json::Value::Null,
            },
        }
    }
}
