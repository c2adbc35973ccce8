//! Position translation between parser conventions and absolute offsets.
//!
//! Each source format reports locations in its own convention: the compiler
//! front end uses 1-based line/column pairs, the markup tag scanner uses
//! 0-based line/character pairs, and the JSON pointer map carries absolute
//! byte offsets directly. Edits are always addressed by absolute byte
//! offset into the original document, so everything funnels through
//! [`LineMap`].
//!
//! The two line/column conventions are distinct types on purpose: a
//! position from one parser must never be interpreted in another parser's
//! convention, and making them different types turns that mistake into a
//! compile error instead of an off-by-one.

/// A 0-based line/character position, as reported by the markup tag
/// scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupPosition {
    pub line: usize,
    pub character: usize,
}

impl MarkupPosition {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// A 1-based line/column position, as reported by the compiler front end
/// for script sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptPosition {
    pub line: usize,
    pub column: usize,
}

impl ScriptPosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Convert to the 0-based markup convention.
    pub fn to_markup(self) -> MarkupPosition {
        MarkupPosition {
            line: self.line - 1,
            character: self.column - 1,
        }
    }
}

/// Per-document translation from line/column positions to absolute byte
/// offsets.
///
/// Built once per document. Line offsets are precomputed as prefix sums
/// (line 0 starts at offset 0, every following line starts one past the
/// previous newline), so each lookup is a single index instead of an
/// O(lines) accumulation.
///
/// Positions handed to a `LineMap` must lie within the document it was
/// built from. Upstream parsers guarantee this, so out-of-range input is a
/// programming error and is not defended against.
#[derive(Debug, Clone)]
pub struct LineMap {
    line_starts: Vec<usize>,
}

impl LineMap {
    pub fn new(content: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    /// Absolute byte offset of a 0-based markup position.
    pub fn offset_of(&self, pos: MarkupPosition) -> usize {
        self.line_starts[pos.line] + pos.character
    }

    /// Absolute byte offset of a 1-based script position.
    pub fn offset_of_script(&self, pos: ScriptPosition) -> usize {
        self.offset_of(pos.to_markup())
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_on_first_line_is_raw_character() {
        let map = LineMap::new("hello world");
        assert_eq!(map.offset_of(MarkupPosition::new(0, 6)), 6);
    }

    #[test]
    fn offset_accumulates_previous_lines_and_newlines() {
        let content = "ab\ncdef\ng";
        let map = LineMap::new(content);
        assert_eq!(map.offset_of(MarkupPosition::new(1, 0)), 3);
        assert_eq!(map.offset_of(MarkupPosition::new(1, 2)), 5);
        assert_eq!(map.offset_of(MarkupPosition::new(2, 0)), 8);
        assert_eq!(&content[5..6], "e");
    }

    #[test]
    fn script_positions_are_one_based() {
        let map = LineMap::new("ab\ncdef");
        assert_eq!(
            map.offset_of_script(ScriptPosition::new(2, 3)),
            map.offset_of(MarkupPosition::new(1, 2))
        );
    }

    #[test]
    fn line_count_includes_trailing_line() {
        assert_eq!(LineMap::new("a\nb\nc").line_count(), 3);
        assert_eq!(LineMap::new("a\nb\n").line_count(), 3);
        assert_eq!(LineMap::new("").line_count(), 1);
    }
}
