//! Source-mapped JSON pointers for manifest documents.
//!
//! A [`PointerMap`] associates every value in a JSON document with its
//! source locations, keyed by an RFC 6901 pointer string (`""` for the
//! root, `/a/b` for nested properties, `/items/0` for array elements).
//! Property entries additionally carry the span of their key token.
//!
//! The map is built once per document by [`build_pointer_map`] and is
//! read-only afterwards; fixes consult it to compute removal and
//! replacement boundaries but never mutate it.

mod scanner;

pub use scanner::{build_pointer_map, JsonMapError};

use std::collections::BTreeMap;

/// A source location: 0-based line and column plus the absolute byte
/// offset `pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loc {
    pub line: usize,
    pub column: usize,
    pub pos: usize,
}

/// Source ranges of one JSON value. `key`/`key_end` span the key token
/// including its quotes and are absent for non-property values (the
/// document root and array elements). `value` points at the first byte of
/// the value, `value_end` one past its last byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEntry {
    pub key: Option<Loc>,
    pub key_end: Option<Loc>,
    pub value: Loc,
    pub value_end: Loc,
}

impl PointerEntry {
    /// Whether this entry describes an object property (as opposed to the
    /// root value or an array element).
    pub fn is_property(&self) -> bool {
        self.key.is_some()
    }
}

/// Pointer string to source ranges, for one document.
pub type PointerMap = BTreeMap<String, PointerEntry>;

/// The parent pointer of `pointer`, or `None` for the document root.
pub fn parent_pointer(pointer: &str) -> Option<&str> {
    pointer.rfind('/').map(|idx| &pointer[..idx])
}

/// Escape one path segment per RFC 6901 (`~` as `~0`, `/` as `~1`).
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn is_sibling(pointer: &str, candidate: &str) -> bool {
    let (Some(parent), Some(candidate_parent)) =
        (parent_pointer(pointer), parent_pointer(candidate))
    else {
        return false;
    };
    parent == candidate_parent && candidate != pointer
}

/// The property preceding `pointer` under the same parent, by key
/// position, if any.
pub fn previous_property_pointer<'a>(
    map: &'a PointerMap,
    current: &PointerEntry,
    pointer: &str,
) -> Option<&'a PointerEntry> {
    let current_key = current.key?;
    map.iter()
        .filter(|(candidate, entry)| is_sibling(pointer, candidate.as_str()) && entry.is_property())
        .filter(|(_, entry)| entry.key.is_some_and(|key| key.pos < current_key.pos))
        .max_by_key(|(_, entry)| entry.key.map(|key| key.pos))
        .map(|(_, entry)| entry)
}

/// The property following `pointer` under the same parent, by key
/// position, if any.
pub fn next_property_pointer<'a>(
    map: &'a PointerMap,
    current: &PointerEntry,
    pointer: &str,
) -> Option<&'a PointerEntry> {
    let current_key = current.key?;
    map.iter()
        .filter(|(candidate, entry)| is_sibling(pointer, candidate.as_str()) && entry.is_property())
        .filter(|(_, entry)| entry.key.is_some_and(|key| key.pos > current_key.pos))
        .min_by_key(|(_, entry)| entry.key.map(|key| key.pos))
        .map(|(_, entry)| entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_pointer_walks_up() {
        assert_eq!(parent_pointer("/a/b"), Some("/a"));
        assert_eq!(parent_pointer("/a"), Some(""));
        assert_eq!(parent_pointer(""), None);
    }

    #[test]
    fn escape_segment_rfc6901() {
        assert_eq!(escape_segment("a/b"), "a~1b");
        assert_eq!(escape_segment("a~b"), "a~0b");
        assert_eq!(escape_segment("plain"), "plain");
    }

    #[test]
    fn sibling_lookup_orders_by_key_position() {
        let source = r#"{ "a": 1, "b": 2, "c": 3 }"#;
        let map = build_pointer_map(source).unwrap();
        let b = map["/b"];

        let previous = previous_property_pointer(&map, &b, "/b").unwrap();
        assert_eq!(previous, &map["/a"]);
        let next = next_property_pointer(&map, &b, "/b").unwrap();
        assert_eq!(next, &map["/c"]);

        let a = map["/a"];
        assert!(previous_property_pointer(&map, &a, "/a").is_none());
        let c = map["/c"];
        assert!(next_property_pointer(&map, &c, "/c").is_none());
    }

    #[test]
    fn nested_properties_are_not_siblings() {
        let source = r#"{ "a": { "x": 1 }, "b": 2 }"#;
        let map = build_pointer_map(source).unwrap();
        let x = map["/a/x"];
        assert!(previous_property_pointer(&map, &x, "/a/x").is_none());
        assert!(next_property_pointer(&map, &x, "/a/x").is_none());
    }
}
