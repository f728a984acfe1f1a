//! Line-start source map for byte ↔ line/column translation.

use crate::span::ByteSpan;
use crate::wire::{WirePosition, WireRange};
use ropey::Rope;

/// Ordered line-start byte offsets over one document's text.
///
/// Built once per loaded document and kept alongside the IR. Lookups are
/// binary searches over the line-start table; column calculation counts
/// UTF-16 code units within the line, which is what LSP clients expect.
///
/// Positions are 0-based. An empty document maps every offset to `0:0`.
#[derive(Debug, Clone)]
pub struct SourceMap {
    line_starts: Vec<usize>,
    text: String,
}

impl SourceMap {
    /// Builds the line-start table for `text`. Handles `\n`, `\r\n`, and
    /// bare `\r` terminators.
    pub fn new(text: String) -> Self {
        let mut line_starts = vec![0];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'\n' {
                line_starts.push(i + 1);
            } else if bytes[i] == b'\r' {
                if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                    line_starts.push(i + 2);
                    i += 1;
                } else {
                    line_starts.push(i + 1);
                }
            }
            i += 1;
        }
        Self { line_starts, text }
    }

    /// Builds the table from a rope without materializing the text twice.
    pub fn from_rope(rope: &Rope) -> Self {
        let mut line_starts = vec![0];
        for li in 1..rope.len_lines() {
            line_starts.push(rope.line_to_byte(li));
        }
        Self { line_starts, text: rope.to_string() }
    }

    /// The raw text this map was built over.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of lines (at least 1, even for empty text).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset to a 0-based `(line, utf16-character)` pair.
    /// Offsets past the end clamp to the final position.
    pub fn offset_to_position(&self, offset: usize) -> WirePosition {
        let mut offset = offset.min(self.text.len());
        // Clamp to the nearest char boundary so mid-character offsets
        // cannot slice invalid UTF-8 ranges.
        while offset > 0 && !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));
        let line_start = self.line_starts[line];
        let character = self.text[line_start..offset]
            .chars()
            .map(|c| c.len_utf16())
            .sum::<usize>() as u32;
        WirePosition::new(line as u32, character)
    }

    /// Converts a 0-based `(line, utf16-character)` position back to a byte
    /// offset. Out-of-range lines clamp to the end of text; out-of-range
    /// characters clamp to the end of the line.
    pub fn position_to_offset(&self, position: WirePosition) -> usize {
        let line = position.line as usize;
        if line >= self.line_starts.len() {
            return self.text.len();
        }
        let line_start = self.line_starts[line];
        let line_end = if line + 1 < self.line_starts.len() {
            // Strip the terminator so a large character never lands past it.
            let next = self.line_starts[line + 1];
            let bytes = self.text.as_bytes();
            let mut end = next;
            while end > line_start && (bytes[end - 1] == b'\n' || bytes[end - 1] == b'\r') {
                end -= 1;
            }
            end
        } else {
            self.text.len()
        };
        let line_text = &self.text[line_start..line_end];
        let mut utf16 = 0usize;
        let mut byte = 0usize;
        for ch in line_text.chars() {
            if utf16 >= position.character as usize {
                break;
            }
            utf16 += ch.len_utf16();
            byte += ch.len_utf8();
        }
        line_start + byte.min(line_text.len())
    }

    /// Converts a byte span to a wire range.
    pub fn span_to_range(&self, span: ByteSpan) -> WireRange {
        WireRange::new(self.offset_to_position(span.start), self.offset_to_position(span.end))
    }

    /// Converts a wire range back to a byte span.
    pub fn range_to_span(&self, range: WireRange) -> ByteSpan {
        ByteSpan::new(self.position_to_offset(range.start), self.position_to_offset(range.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        let map = SourceMap::new(String::new());
        assert_eq!(map.line_count(), 1);
        assert_eq!(map.offset_to_position(0), WirePosition::new(0, 0));
        assert_eq!(map.offset_to_position(42), WirePosition::new(0, 0));
        let range = map.span_to_range(ByteSpan::empty(0));
        assert_eq!(range, WireRange::new(WirePosition::new(0, 0), WirePosition::new(0, 0)));
    }

    #[test]
    fn test_offset_to_position_ascii() {
        let map = SourceMap::new("openapi: 3.1.0\npaths: {}\n".to_string());
        assert_eq!(map.offset_to_position(0), WirePosition::new(0, 0));
        assert_eq!(map.offset_to_position(9), WirePosition::new(0, 9));
        assert_eq!(map.offset_to_position(15), WirePosition::new(1, 0));
        assert_eq!(map.offset_to_position(21), WirePosition::new(1, 6));
    }

    #[test]
    fn test_monotone_in_offset() {
        let map = SourceMap::new("a: 1\nbb: 2\nccc: 3\n".to_string());
        let mut prev = WirePosition::new(0, 0);
        for offset in 0..map.text().len() {
            let pos = map.offset_to_position(offset);
            assert!(
                pos.line > prev.line || (pos.line == prev.line && pos.character >= prev.character),
                "position went backwards at offset {offset}"
            );
            prev = pos;
        }
    }

    #[test]
    fn test_non_ascii_columns_are_utf16() {
        // 'é' is 2 bytes in UTF-8 but 1 UTF-16 unit.
        let map = SourceMap::new("name: café\nnext: 1\n".to_string());
        // Byte offset just past 'é' (6 + 3 ASCII chars + 2 bytes).
        let after_e = "name: café".len();
        assert_eq!(map.offset_to_position(after_e), WirePosition::new(0, 10));
        assert_eq!(map.offset_to_position(after_e + 1), WirePosition::new(1, 0));
    }

    #[test]
    fn test_position_to_offset_roundtrip() {
        let text = "openapi: 3.0.3\ninfo:\n  title: Demo API\n".to_string();
        let map = SourceMap::new(text.clone());
        for offset in 0..text.len() {
            if text.is_char_boundary(offset) {
                let pos = map.offset_to_position(offset);
                assert_eq!(map.position_to_offset(pos), offset);
            }
        }
    }

    #[test]
    fn test_position_clamps_past_line_end() {
        let map = SourceMap::new("ab\ncd\n".to_string());
        assert_eq!(map.position_to_offset(WirePosition::new(0, 99)), 2);
        assert_eq!(map.position_to_offset(WirePosition::new(9, 0)), 6);
    }

    #[test]
    fn test_crlf_line_starts() {
        let map = SourceMap::new("a: 1\r\nb: 2\r\n".to_string());
        assert_eq!(map.offset_to_position(6), WirePosition::new(1, 0));
        assert_eq!(map.offset_to_position(10), WirePosition::new(1, 4));
    }

    #[test]
    fn test_from_rope_matches_new() {
        let text = "paths:\n  /users:\n    get: {}\n";
        let from_str = SourceMap::new(text.to_string());
        let from_rope = SourceMap::from_rope(&Rope::from_str(text));
        for offset in 0..text.len() {
            assert_eq!(from_str.offset_to_position(offset), from_rope.offset_to_position(offset));
        }
    }
}
