//! Streaming tag scanner for markup sources.
//!
//! Produces [`MarkupEvent`]s with byte-accurate token spans, including
//! attribute name and value sub-ranges and the quoting style of each
//! value. The inputs this engine sees are HTML bootstrap pages and XML
//! views, so the scanner tolerates the quirks those actually contain:
//! unquoted and valueless attributes, whitespace around `=`, comments,
//! doctypes and raw `<script>` bodies. It does not validate structure;
//! anything that is not an element header is skipped.

use crate::markup::{AttrValue, Attribute, MarkupEvent, SpanText, Tag};
use crate::position::MarkupPosition;

/// Scan `content` and return its structural events in document order.
pub fn scan(content: &str) -> Vec<MarkupEvent> {
    let mut cur = Cursor::new(content);
    let mut events = Vec::new();

    while let Some(b) = cur.peek() {
        if b != b'<' {
            cur.bump();
            continue;
        }
        if cur.starts_with(b"<!--") {
            cur.skip_until(b"-->");
            continue;
        }
        match cur.peek_at(1) {
            // Doctype, processing instruction or close tag: no events.
            Some(b'!') | Some(b'?') | Some(b'/') => {
                cur.skip_until(b">");
            }
            Some(c) if is_tag_name_start(c) => {
                let tag = scan_tag(&mut cur);
                for attr in &tag.attributes {
                    events.push(MarkupEvent::Attribute(attr.clone()));
                }
                let raw_body = !tag.self_closing && tag.name.text.eq_ignore_ascii_case("script");
                events.push(MarkupEvent::OpenTag(tag));
                if raw_body {
                    cur.skip_raw_text(b"</script");
                }
            }
            _ => {
                cur.bump();
            }
        }
    }

    events
}

fn is_tag_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':'
}

fn scan_tag(cur: &mut Cursor) -> Tag {
    let open_start = cur.pos();
    cur.bump(); // '<'

    let name_start = cur.pos();
    let name_from = cur.index();
    while let Some(b) = cur.peek() {
        if b.is_ascii_whitespace() || b == b'>' || b == b'/' {
            break;
        }
        cur.bump();
    }
    let name = cur.span_from(name_from, name_start);

    let mut attributes = Vec::new();
    let mut self_closing = false;
    loop {
        cur.skip_whitespace();
        match cur.peek() {
            None => break,
            Some(b'>') => {
                cur.bump();
                break;
            }
            Some(b'/') if cur.peek_at(1) == Some(b'>') => {
                cur.bump();
                cur.bump();
                self_closing = true;
                break;
            }
            Some(b'/') => {
                cur.bump();
            }
            Some(_) => attributes.push(scan_attribute(cur)),
        }
    }

    Tag {
        open_start,
        name,
        attributes,
        self_closing,
    }
}

fn scan_attribute(cur: &mut Cursor) -> Attribute {
    let name_start = cur.pos();
    let name_from = cur.index();
    while let Some(b) = cur.peek() {
        if b.is_ascii_whitespace() || b == b'=' || b == b'>' {
            break;
        }
        if b == b'/' && cur.peek_at(1) == Some(b'>') {
            break;
        }
        cur.bump();
    }
    let name = cur.span_from(name_from, name_start);

    // Whitespace may separate the name from `=` and `=` from the value.
    // If no `=` follows, the whitespace belongs to the next attribute.
    let checkpoint = cur.checkpoint();
    cur.skip_whitespace();
    if cur.peek() != Some(b'=') {
        cur.restore(checkpoint);
        return Attribute {
            name,
            value: AttrValue::Valueless,
        };
    }
    cur.bump(); // '='
    cur.skip_whitespace();

    match cur.peek() {
        Some(quote @ (b'"' | b'\'')) => {
            cur.bump();
            let value_start = cur.pos();
            let value_from = cur.index();
            while let Some(b) = cur.peek() {
                if b == quote {
                    break;
                }
                cur.bump();
            }
            let value = cur.span_from(value_from, value_start);
            if cur.peek() == Some(quote) {
                cur.bump();
            }
            let value = if quote == b'"' {
                AttrValue::DoubleQuoted(value)
            } else {
                AttrValue::SingleQuoted(value)
            };
            Attribute { name, value }
        }
        _ => {
            let value_start = cur.pos();
            let value_from = cur.index();
            while let Some(b) = cur.peek() {
                if b.is_ascii_whitespace() || b == b'>' {
                    break;
                }
                if b == b'/' && cur.peek_at(1) == Some(b'>') {
                    break;
                }
                cur.bump();
            }
            Attribute {
                name,
                value: AttrValue::Unquoted(cur.span_from(value_from, value_start)),
            }
        }
    }
}

struct Checkpoint {
    i: usize,
    line: usize,
    col: usize,
}

/// Byte cursor that tracks the 0-based line and the byte column within
/// the line. Token boundaries are always ASCII delimiters, so byte
/// ranges taken between them are valid `&str` slices.
struct Cursor<'a> {
    src: &'a str,
    bytes: &'a [u8],
    i: usize,
    line: usize,
    col: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            i: 0,
            line: 0,
            col: 0,
        }
    }

    fn pos(&self) -> MarkupPosition {
        MarkupPosition::new(self.line, self.col)
    }

    fn index(&self) -> usize {
        self.i
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.i).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.i + offset).copied()
    }

    fn bump(&mut self) {
        if let Some(&b) = self.bytes.get(self.i) {
            self.i += 1;
            if b == b'\n' {
                self.line += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
        }
    }

    fn starts_with(&self, pattern: &[u8]) -> bool {
        self.bytes[self.i..].starts_with(pattern)
    }

    fn starts_with_ignore_case(&self, pattern: &[u8]) -> bool {
        self.bytes[self.i..]
            .get(..pattern.len())
            .is_some_and(|slice| slice.eq_ignore_ascii_case(pattern))
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.bump();
        }
    }

    /// Advance past the next occurrence of `pattern`, or to end of input.
    fn skip_until(&mut self, pattern: &[u8]) {
        while self.peek().is_some() {
            if self.starts_with(pattern) {
                for _ in 0..pattern.len() {
                    self.bump();
                }
                return;
            }
            self.bump();
        }
    }

    /// Advance to (not past) the next occurrence of `pattern`, ignoring
    /// ASCII case. Used for raw element bodies.
    fn skip_raw_text(&mut self, pattern: &[u8]) {
        while self.peek().is_some() {
            if self.peek() == Some(b'<') && self.starts_with_ignore_case(pattern) {
                return;
            }
            self.bump();
        }
    }

    fn span_from(&self, from: usize, start: MarkupPosition) -> SpanText {
        SpanText {
            text: self.src[from..self.i].to_string(),
            start,
            end: self.pos(),
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            i: self.i,
            line: self.line,
            col: self.col,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.i = checkpoint.i;
        self.line = checkpoint.line;
        self.col = checkpoint.col;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::LineMap;

    fn open_tags(content: &str) -> Vec<Tag> {
        scan(content)
            .into_iter()
            .filter_map(|event| match event {
                MarkupEvent::OpenTag(tag) => Some(tag),
                MarkupEvent::Attribute(_) => None,
            })
            .collect()
    }

    /// Every reported span must slice the original text back to the
    /// reported token.
    fn assert_span(content: &str, span: &SpanText) {
        let map = LineMap::new(content);
        let start = map.offset_of(span.start);
        let end = map.offset_of(span.end);
        assert_eq!(&content[start..end], span.text);
    }

    #[test]
    fn quoted_attributes() {
        let content = r#"<script remove="me" keep='me'>"#;
        let tags = open_tags(content);
        assert_eq!(tags.len(), 1);
        let tag = &tags[0];
        assert_eq!(tag.name.text, "script");
        assert_eq!(tag.attributes.len(), 2);

        let first = &tag.attributes[0];
        assert_eq!(first.name.text, "remove");
        assert!(matches!(first.value, AttrValue::DoubleQuoted(_)));
        assert_span(content, &first.name);
        assert_span(content, first.value.text().unwrap());

        let second = &tag.attributes[1];
        assert!(matches!(second.value, AttrValue::SingleQuoted(_)));
        assert_eq!(second.value.text().unwrap().text, "me");
    }

    #[test]
    fn unquoted_and_valueless_attributes() {
        let content = "<script no-quotes=remove no-value x>";
        let tag = &open_tags(content)[0];
        assert_eq!(tag.attributes.len(), 3);
        assert!(matches!(tag.attributes[0].value, AttrValue::Unquoted(_)));
        assert_eq!(tag.attributes[0].value.text().unwrap().text, "remove");
        assert!(matches!(tag.attributes[1].value, AttrValue::Valueless));
        assert!(matches!(tag.attributes[2].value, AttrValue::Valueless));
        assert_eq!(tag.attributes[2].name.text, "x");
        for attr in &tag.attributes {
            assert_span(content, &attr.name);
        }
    }

    #[test]
    fn whitespace_around_equals() {
        let content = "<script a =\"1\" b= 2 c = '3'>";
        let tag = &open_tags(content)[0];
        assert_eq!(tag.attributes.len(), 3);
        assert_eq!(tag.attributes[0].value.text().unwrap().text, "1");
        assert_eq!(tag.attributes[1].value.text().unwrap().text, "2");
        assert_eq!(tag.attributes[2].value.text().unwrap().text, "3");
    }

    #[test]
    fn zero_whitespace_between_attributes() {
        let content = r#"<script attr="def"ignore=xyz>"#;
        let tag = &open_tags(content)[0];
        assert_eq!(tag.attributes.len(), 2);
        let attr = &tag.attributes[0];
        let next = &tag.attributes[1];
        assert_eq!(next.name.text, "ignore");
        // The next name starts right after the closing quote.
        let value_end = attr.value.text().unwrap().end;
        assert_eq!(next.name.start.character, value_end.character + 1);
    }

    #[test]
    fn multi_line_tag_positions() {
        let content = "<script remove=\"me\"\n\tkeep=\"me\">";
        let tag = &open_tags(content)[0];
        let keep = &tag.attributes[1];
        assert_eq!(keep.name.start, MarkupPosition::new(1, 1));
        assert_span(content, &keep.name);
        assert_span(content, keep.value.text().unwrap());
    }

    #[test]
    fn tag_name_span_and_open_start() {
        let content = "text <view:Table rows=\"x\"/> more";
        let tag = &open_tags(content)[0];
        assert_eq!(tag.open_start, MarkupPosition::new(0, 5));
        assert_eq!(tag.name.text, "view:Table");
        assert!(tag.self_closing);
        assert_span(content, &tag.name);
    }

    #[test]
    fn attribute_events_precede_open_tag() {
        let events = scan("<a x=\"1\"><b/>");
        assert!(matches!(events[0], MarkupEvent::Attribute(_)));
        assert!(matches!(events[1], MarkupEvent::OpenTag(_)));
        assert!(matches!(events[2], MarkupEvent::OpenTag(_)));
    }

    #[test]
    fn comments_and_doctype_produce_no_events() {
        let events = scan("<!Doctype HTML>\n<!-- <fake attr=\"1\"> -->\n<real>");
        assert_eq!(events.len(), 1);
        let MarkupEvent::OpenTag(tag) = &events[0] else {
            panic!("expected open tag");
        };
        assert_eq!(tag.name.text, "real");
    }

    #[test]
    fn script_body_is_raw_text() {
        let content = "<script>\nif (a < b) { run(\"<div>\"); }\n</script>\n<next>";
        let tags = open_tags(content);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name.text, "script");
        assert_eq!(tags[1].name.text, "next");
    }

    #[test]
    fn single_character_attribute_names() {
        let content = "<script ,\n\t.>";
        let tag = &open_tags(content)[0];
        assert_eq!(tag.attributes.len(), 2);
        assert_eq!(tag.attributes[0].name.text, ",");
        let name = &tag.attributes[0].name;
        assert_eq!(name.end.character, name.start.character + 1);
    }
}
