//! One-pass source-map builder for JSON documents.
//!
//! Walks the document once and records, for every value, the byte ranges
//! of its key and value tokens, keyed by RFC 6901 pointer. The engine
//! needs token *positions*, which general-purpose JSON parsers discard,
//! so this scanner exists solely to produce the [`PointerMap`]; it does
//! not build a value tree.

use crate::json::{escape_segment, Loc, PointerEntry, PointerMap};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JsonMapError {
    #[error("unexpected character '{found}' at line {line}, column {column}")]
    Unexpected {
        found: char,
        line: usize,
        column: usize,
    },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("invalid escape sequence at line {line}, column {column}")]
    InvalidEscape { line: usize, column: usize },

    #[error("trailing content after document end at line {line}, column {column}")]
    TrailingContent { line: usize, column: usize },
}

/// Build the pointer map for `content`.
pub fn build_pointer_map(content: &str) -> Result<PointerMap, JsonMapError> {
    let mut scanner = Scanner::new(content);
    let mut map = PointerMap::new();
    scanner.skip_whitespace();
    scanner.parse_value(String::new(), None, &mut map)?;
    scanner.skip_whitespace();
    if scanner.peek().is_some() {
        return Err(scanner.trailing_content());
    }
    Ok(map)
}

struct Scanner<'a> {
    bytes: &'a [u8],
    i: usize,
    line: usize,
    col: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            bytes: src.as_bytes(),
            i: 0,
            line: 0,
            col: 0,
        }
    }

    fn loc(&self) -> Loc {
        Loc {
            line: self.line,
            column: self.col,
            pos: self.i,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.i).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(b)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.bump();
        }
    }

    fn unexpected(&self) -> JsonMapError {
        match self.peek() {
            Some(b) => JsonMapError::Unexpected {
                found: b as char,
                line: self.line + 1,
                column: self.col + 1,
            },
            None => JsonMapError::UnexpectedEof,
        }
    }

    fn trailing_content(&self) -> JsonMapError {
        JsonMapError::TrailingContent {
            line: self.line + 1,
            column: self.col + 1,
        }
    }

    fn expect(&mut self, expected: u8) -> Result<(), JsonMapError> {
        if self.peek() == Some(expected) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_value(
        &mut self,
        pointer: String,
        key_span: Option<(Loc, Loc)>,
        map: &mut PointerMap,
    ) -> Result<(), JsonMapError> {
        let value = self.loc();
        match self.peek() {
            Some(b'{') => self.parse_object(&pointer, map)?,
            Some(b'[') => self.parse_array(&pointer, map)?,
            Some(b'"') => {
                self.parse_string()?;
            }
            Some(b't') => self.parse_literal(b"true")?,
            Some(b'f') => self.parse_literal(b"false")?,
            Some(b'n') => self.parse_literal(b"null")?,
            Some(b'-') | Some(b'0'..=b'9') => self.parse_number()?,
            _ => return Err(self.unexpected()),
        }
        let value_end = self.loc();
        map.insert(
            pointer,
            PointerEntry {
                key: key_span.map(|(start, _)| start),
                key_end: key_span.map(|(_, end)| end),
                value,
                value_end,
            },
        );
        Ok(())
    }

    fn parse_object(&mut self, pointer: &str, map: &mut PointerMap) -> Result<(), JsonMapError> {
        self.expect(b'{')?;
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.bump();
            return Ok(());
        }
        loop {
            let key_start = self.loc();
            let key = self.parse_string()?;
            let key_end = self.loc();
            self.skip_whitespace();
            self.expect(b':')?;
            self.skip_whitespace();
            let child = format!("{pointer}/{}", escape_segment(&key));
            self.parse_value(child, Some((key_start, key_end)), map)?;
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.bump();
                    self.skip_whitespace();
                }
                Some(b'}') => {
                    self.bump();
                    return Ok(());
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn parse_array(&mut self, pointer: &str, map: &mut PointerMap) -> Result<(), JsonMapError> {
        self.expect(b'[')?;
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.bump();
            return Ok(());
        }
        let mut index = 0usize;
        loop {
            let child = format!("{pointer}/{index}");
            self.parse_value(child, None, map)?;
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.bump();
                    self.skip_whitespace();
                    index += 1;
                }
                Some(b']') => {
                    self.bump();
                    return Ok(());
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    /// Parse a string token (cursor on the opening quote) and return its
    /// decoded text. Object keys need decoding so that pointer segments
    /// match what a JSON parser would report.
    fn parse_string(&mut self) -> Result<String, JsonMapError> {
        self.expect(b'"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(JsonMapError::UnexpectedEof),
                Some(b'"') => return Ok(out),
                Some(b'\\') => {
                    let escape_loc = self.loc();
                    match self.bump() {
                        None => return Err(JsonMapError::UnexpectedEof),
                        Some(b'"') => out.push('"'),
                        Some(b'\\') => out.push('\\'),
                        Some(b'/') => out.push('/'),
                        Some(b'b') => out.push('\u{0008}'),
                        Some(b'f') => out.push('\u{000C}'),
                        Some(b'n') => out.push('\n'),
                        Some(b'r') => out.push('\r'),
                        Some(b't') => out.push('\t'),
                        Some(b'u') => {
                            let mut code = 0u32;
                            for _ in 0..4 {
                                let digit = self
                                    .bump()
                                    .and_then(|b| (b as char).to_digit(16))
                                    .ok_or(JsonMapError::InvalidEscape {
                                        line: escape_loc.line + 1,
                                        column: escape_loc.column + 1,
                                    })?;
                                code = code * 16 + digit;
                            }
                            // Surrogate pairs are left as replacement
                            // characters; manifest keys never contain them.
                            out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                        }
                        Some(_) => {
                            return Err(JsonMapError::InvalidEscape {
                                line: escape_loc.line + 1,
                                column: escape_loc.column + 1,
                            })
                        }
                    }
                }
                Some(b) if b < 0x80 => out.push(b as char),
                Some(b) => {
                    // Re-assemble a multi-byte UTF-8 sequence.
                    let mut buf = vec![b];
                    while let Some(next) = self.peek() {
                        if next & 0xC0 != 0x80 {
                            break;
                        }
                        self.bump();
                        buf.push(next);
                    }
                    out.push_str(&String::from_utf8_lossy(&buf));
                }
            }
        }
    }

    fn parse_number(&mut self) -> Result<(), JsonMapError> {
        if self.peek() == Some(b'-') {
            self.bump();
        }
        let mut digits = 0;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
        {
            digits += 1;
            self.bump();
        }
        if digits == 0 {
            return Err(self.unexpected());
        }
        Ok(())
    }

    fn parse_literal(&mut self, literal: &[u8]) -> Result<(), JsonMapError> {
        for &expected in literal {
            if self.peek() != Some(expected) {
                return Err(self.unexpected());
            }
            self.bump();
        }
        Ok(())
    }
}
