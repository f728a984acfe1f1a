//! Event-stream to IR tree construction.
//!
//! yaml-rust2's marked events report character indices; the builder converts
//! them to byte offsets up front and derives end offsets from the raw text:
//! quoted scalars scan to their closing quote, plain scalars use their byte
//! length, and containers end where their closing event begins (trimmed of
//! trailing whitespace and comment lines).

use oas_ir::{IrKind, IrNode, NodeLoc, ParseIssue, ScalarValue};
use oas_position_tracking::ByteSpan;
use oas_uri::{ROOT_POINTER, child_pointer, index_pointer};
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

#[derive(Default)]
struct EventSink {
    events: Vec<(Event, Marker)>,
}

impl MarkedEventReceiver for EventSink {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        self.events.push((ev, mark));
    }
}

/// Parse `text` into an IR tree. Returns the root node (when anything
/// parsed) and any issues encountered. Only the first YAML document in a
/// multi-document stream is analyzed.
pub(crate) fn parse_ir(text: &str) -> (Option<IrNode>, Vec<ParseIssue>) {
    let mut sink = EventSink::default();
    let mut parser = Parser::new(text.chars());
    let mut issues = Vec::new();

    if let Err(err) = parser.load(&mut sink, true) {
        let table = char_to_byte_table(text);
        let at = byte_at(&table, err.marker().index());
        issues.push(ParseIssue { message: err.to_string(), span: ByteSpan::empty(at) });
        return (None, issues);
    }

    let table = char_to_byte_table(text);
    let events: Vec<(Event, usize)> =
        sink.events.into_iter().map(|(ev, mark)| (ev, byte_at(&table, mark.index()))).collect();

    let mut builder = TreeBuilder::new(text);
    for i in 0..events.len() {
        let bound = events.get(i + 1).map_or(text.len(), |(_, b)| *b);
        let (ev, start) = &events[i];
        builder.on_event(ev, *start, bound);
    }
    issues.extend(builder.issues);
    (builder.root, issues)
}

fn char_to_byte_table(text: &str) -> Vec<usize> {
    let mut table: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
    table.push(text.len());
    table
}

fn byte_at(table: &[usize], char_index: usize) -> usize {
    let last = table.len() - 1;
    table[char_index.min(last)]
}

struct PendingKey {
    text: String,
    start: usize,
    end: usize,
}

struct Frame {
    node: IrNode,
    is_map: bool,
    pending_key: Option<PendingKey>,
    next_index: usize,
    /// Key of this container within its parent, applied when it closes.
    own_key: Option<PendingKey>,
}

struct TreeBuilder<'a> {
    text: &'a str,
    root: Option<IrNode>,
    stack: Vec<Frame>,
    issues: Vec<ParseIssue>,
    doc_index: usize,
}

impl<'a> TreeBuilder<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, root: None, stack: Vec::new(), issues: Vec::new(), doc_index: 0 }
    }

    fn on_event(&mut self, ev: &Event, start: usize, bound: usize) {
        match ev {
            Event::StreamStart | Event::StreamEnd | Event::Nothing => {}
            Event::DocumentStart => {
                self.doc_index += 1;
                if self.doc_index == 2 {
                    self.issues.push(ParseIssue {
                        message: "multiple YAML documents in one file; only the first is analyzed"
                            .to_string(),
                        span: ByteSpan::empty(start),
                    });
                }
            }
            Event::DocumentEnd => {}
            _ if self.doc_index > 1 => {}
            Event::Scalar(value, style, _, tag) => {
                self.on_scalar(value, *style, tag.as_ref(), start, bound)
            }
            Event::Alias(_) => {
                // Aliases are recorded as null scalars at their own location;
                // expanding them would duplicate subtrees under misleading
                // pointers.
                let end = token_end(self.text.as_bytes(), start, bound);
                let (ptr, key) = self.value_slot();
                let node = IrNode::scalar(
                    IrKind::Null,
                    ScalarValue::Null,
                    ptr,
                    NodeLoc::new(start, end),
                );
                self.attach_value(node, key);
            }
            Event::MappingStart(..) => self.open_container(IrKind::Object, start),
            Event::SequenceStart(..) => self.open_container(IrKind::Array, start),
            Event::MappingEnd => self.close_container(start, b'}'),
            Event::SequenceEnd => self.close_container(start, b']'),
        }
    }

    fn on_scalar(
        &mut self,
        value: &str,
        style: TScalarStyle,
        tag: Option<&Tag>,
        start: usize,
        bound: usize,
    ) {
        // A scalar in key position of an open mapping is the key, not a node.
        if let Some(frame) = self.stack.last_mut() {
            if frame.is_map && frame.pending_key.is_none() {
                let end = scalar_end(self.text.as_bytes(), start, value, style, bound);
                frame.pending_key = Some(PendingKey { text: value.to_string(), start, end });
                return;
            }
        }
        let end = scalar_end(self.text.as_bytes(), start, value, style, bound);
        let (kind, scalar) = classify_scalar(value, style, tag);
        let (ptr, key) = self.value_slot();
        let node = IrNode::scalar(kind, scalar, ptr, NodeLoc::new(start, end));
        self.attach_value(node, key);
    }

    /// Pointer and key context for the next value in the current container.
    fn value_slot(&mut self) -> (String, Option<PendingKey>) {
        match self.stack.last_mut() {
            None => (ROOT_POINTER.to_string(), None),
            Some(frame) if frame.is_map => {
                // A container opening in key position is folded in as the
                // value of an empty key; complex keys carry no meaning in
                // OpenAPI documents.
                let key = frame.pending_key.take().unwrap_or(PendingKey {
                    text: String::new(),
                    start: 0,
                    end: 0,
                });
                let ptr = child_pointer(&frame.node.ptr, &key.text);
                (ptr, Some(key))
            }
            Some(frame) => {
                let ptr = index_pointer(&frame.node.ptr, frame.next_index);
                frame.next_index += 1;
                (ptr, None)
            }
        }
    }

    fn attach_value(&mut self, mut node: IrNode, key: Option<PendingKey>) {
        if let Some(key) = key {
            apply_key(&mut node, key, true);
        }
        match self.stack.last_mut() {
            Some(frame) => frame.node.children.push(node),
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
        }
    }

    fn open_container(&mut self, kind: IrKind, start: usize) {
        let (ptr, key) = self.value_slot();
        let node = IrNode::container(kind, ptr, NodeLoc::new(start, start));
        self.stack.push(Frame {
            is_map: kind == IrKind::Object,
            node,
            pending_key: None,
            next_index: 0,
            own_key: key,
        });
    }

    fn close_container(&mut self, end_mark: usize, closer: u8) {
        let Some(mut frame) = self.stack.pop() else { return };
        let bytes = self.text.as_bytes();
        frame.node.loc.end = if bytes.get(end_mark) == Some(&closer) {
            end_mark + 1
        } else {
            rtrim_end(bytes, frame.node.loc.start, end_mark)
        };
        let mut node = frame.node;
        if let Some(key) = frame.own_key {
            apply_key(&mut node, key, false);
        }
        match self.stack.last_mut() {
            Some(parent) => parent.node.children.push(node),
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
        }
    }
}

/// Stamp key metadata onto a mapping-pair value. Scalar values also record
/// their own token span separately; the pair span then runs from the key
/// token to the value end.
fn apply_key(node: &mut IrNode, key: PendingKey, record_value_span: bool) {
    if key.start == 0 && key.end == 0 && key.text.is_empty() {
        node.key = Some(key.text);
        return;
    }
    if record_value_span {
        node.loc.val_start = Some(node.loc.start);
        node.loc.val_end = Some(node.loc.end);
    }
    node.loc.key_start = Some(key.start);
    node.loc.key_end = Some(key.end);
    node.loc.start = key.start.min(node.loc.start);
    node.key = Some(key.text);
}

fn classify_scalar(value: &str, style: TScalarStyle, tag: Option<&Tag>) -> (IrKind, ScalarValue) {
    if let Some(tag) = tag {
        match tag.suffix.as_str() {
            "str" => return (IrKind::String, ScalarValue::String(value.to_string())),
            "null" => return (IrKind::Null, ScalarValue::Null),
            "bool" => {
                let truthy = matches!(value, "true" | "True" | "TRUE");
                return (IrKind::Boolean, ScalarValue::Boolean(truthy));
            }
            "int" | "float" => {
                if let Ok(n) = value.parse::<f64>() {
                    return (IrKind::Number, ScalarValue::Number(n));
                }
            }
            _ => {}
        }
    }
    if style != TScalarStyle::Plain {
        return (IrKind::String, ScalarValue::String(value.to_string()));
    }
    match value {
        "" | "~" | "null" | "Null" | "NULL" => (IrKind::Null, ScalarValue::Null),
        "true" | "True" | "TRUE" => (IrKind::Boolean, ScalarValue::Boolean(true)),
        "false" | "False" | "FALSE" => (IrKind::Boolean, ScalarValue::Boolean(false)),
        _ => match parse_number(value) {
            Some(n) => (IrKind::Number, ScalarValue::Number(n)),
            None => (IrKind::String, ScalarValue::String(value.to_string())),
        },
    }
}

fn parse_number(value: &str) -> Option<f64> {
    let first = value.as_bytes().first()?;
    if !(first.is_ascii_digit() || matches!(first, b'-' | b'+' | b'.')) {
        return None;
    }
    value.parse::<f64>().ok()
}

/// End offset of a scalar token starting at `start`.
fn scalar_end(bytes: &[u8], start: usize, value: &str, style: TScalarStyle, bound: usize) -> usize {
    match style {
        TScalarStyle::SingleQuoted => closing_quote(bytes, start, b'\'', bound),
        TScalarStyle::DoubleQuoted => closing_quote(bytes, start, b'"', bound),
        TScalarStyle::Plain => {
            let estimated = start + value.len();
            estimated.min(rtrim_end(bytes, start, bound))
        }
        _ => rtrim_end(bytes, start, bound),
    }
}

fn closing_quote(bytes: &[u8], start: usize, quote: u8, bound: usize) -> usize {
    let limit = bound.min(bytes.len());
    let mut i = if bytes.get(start) == Some(&quote) { start + 1 } else { start };
    while i < limit {
        let b = bytes[i];
        if quote == b'"' && b == b'\\' {
            i += 2;
            continue;
        }
        if b == quote {
            // Single-quoted style escapes the quote by doubling it.
            if quote == b'\'' && bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    rtrim_end(bytes, start, bound)
}

/// End of a whitespace-delimited token (aliases, anchors).
fn token_end(bytes: &[u8], start: usize, bound: usize) -> usize {
    let limit = bound.min(bytes.len());
    let mut i = start;
    while i < limit && !bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Walk back from `bound`, dropping trailing whitespace and whole trailing
/// comment lines, never shrinking past `start`.
fn rtrim_end(bytes: &[u8], start: usize, bound: usize) -> usize {
    let mut end = bound.min(bytes.len()).max(start);
    loop {
        while end > start && bytes[end - 1].is_ascii_whitespace() {
            end -= 1;
        }
        let line_start = bytes[start..end]
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|i| start + i + 1)
            .unwrap_or(start);
        if line_start <= start {
            return end;
        }
        let mut i = line_start;
        while i < end && (bytes[i] == b' ' || bytes[i] == b'\t') {
            i += 1;
        }
        if i < end && bytes[i] == b'#' {
            end = line_start;
        } else {
            return end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oas_tdd_support::must_some;

    fn parse(text: &str) -> IrNode {
        let (root, issues) = parse_ir(text);
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
        must_some(root)
    }

    #[test]
    fn test_simple_mapping() {
        let text = "openapi: 3.1.0\ninfo:\n  title: Demo\n";
        let root = parse(text);
        assert_eq!(root.kind, IrKind::Object);
        assert_eq!(root.ptr, "#");
        assert_eq!(root.child_str("openapi"), Some("3.1.0"));
        let title = must_some(root.get("#/info/title"));
        assert_eq!(title.as_str(), Some("Demo"));
    }

    #[test]
    fn test_key_and_value_spans() {
        let text = "openapi: 3.1.0\n";
        let root = parse(text);
        let node = must_some(root.child("openapi"));
        let key = must_some(node.loc.key_span());
        assert_eq!(key.slice(text), Some("openapi"));
        let val = must_some(node.loc.value_span());
        assert_eq!(val.slice(text), Some("3.1.0"));
        // Pair span runs key start to value end.
        assert_eq!(node.loc.start, key.start);
        assert_eq!(node.loc.end, val.end);
    }

    #[test]
    fn test_quoted_scalar_span_includes_quotes() {
        let text = "title: \"Demo API\"\n";
        let root = parse(text);
        let node = must_some(root.child("title"));
        let val = must_some(node.loc.value_span());
        assert_eq!(val.slice(text), Some("\"Demo API\""));
        assert_eq!(node.as_str(), Some("Demo API"));
    }

    #[test]
    fn test_scalar_kinds() {
        let text = "a: 1\nb: 2.5\nc: true\nd: null\ne: ~\nf: '1'\ng: 3.0.1\n";
        let root = parse(text);
        assert_eq!(must_some(root.child("a")).kind, IrKind::Number);
        assert_eq!(must_some(root.child("b")).as_f64(), Some(2.5));
        assert_eq!(must_some(root.child("c")).as_bool(), Some(true));
        assert_eq!(must_some(root.child("d")).kind, IrKind::Null);
        assert_eq!(must_some(root.child("e")).kind, IrKind::Null);
        assert_eq!(must_some(root.child("f")).kind, IrKind::String);
        // Not a number: two dots.
        assert_eq!(must_some(root.child("g")).as_str(), Some("3.0.1"));
    }

    #[test]
    fn test_sequence_pointers() {
        let text = "servers:\n  - url: a\n  - url: b\n";
        let root = parse(text);
        let servers = must_some(root.child("servers"));
        assert_eq!(servers.kind, IrKind::Array);
        assert_eq!(servers.children.len(), 2);
        assert_eq!(servers.children[0].ptr, "#/servers/0");
        assert_eq!(must_some(root.get("#/servers/1/url")).as_str(), Some("b"));
    }

    #[test]
    fn test_escaped_pointer_segments() {
        let text = "paths:\n  /users/{id}:\n    get: {}\n";
        let root = parse(text);
        let item = must_some(root.get("#/paths/~1users~1{id}"));
        assert!(item.child("get").is_some());
    }

    #[test]
    fn test_flow_collections() {
        let text = "paths: { /a: { get: { responses: { '200': { description: ok } } } } }\n";
        let root = parse(text);
        assert!(root.get("#/paths/~1a/get/responses/200").is_some());
        let paths = must_some(root.child("paths"));
        let span = paths.loc.span();
        assert_eq!(span.slice(text).map(|s| s.ends_with('}')), Some(true));
    }

    #[test]
    fn test_root_null_document() {
        let (root, issues) = parse_ir("null\n");
        assert!(issues.is_empty());
        assert_eq!(must_some(root).kind, IrKind::Null);
    }

    #[test]
    fn test_empty_document() {
        let (root, issues) = parse_ir("");
        assert!(root.is_none());
        assert!(issues.is_empty());
    }

    #[test]
    fn test_parse_error_reports_issue() {
        let (root, issues) = parse_ir("a: [unclosed\n");
        assert!(root.is_none());
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_multi_document_keeps_first() {
        let (root, issues) = parse_ir("---\na: 1\n---\nb: 2\n");
        let root = must_some(root);
        assert!(root.child("a").is_some());
        assert!(root.child("b").is_none());
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("first"));
    }

    #[test]
    fn test_non_ascii_offsets_are_bytes() {
        let text = "x: café\ny: 1\n";
        let root = parse(text);
        let x = must_some(root.child("x"));
        let val = must_some(x.loc.value_span());
        assert_eq!(val.slice(text), Some("café"));
        let y = must_some(root.child("y"));
        let key = must_some(y.loc.key_span());
        assert_eq!(key.slice(text), Some("y"));
    }

    #[test]
    fn test_trailing_comment_not_in_container_span() {
        let text = "info:\n  title: T\n# done\nother: 1\n";
        let root = parse(text);
        let info = must_some(root.child("info"));
        let text_of = must_some(info.loc.span().slice(text));
        assert!(!text_of.contains("# done"), "got {text_of:?}");
    }
}
