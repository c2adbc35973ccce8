//! Attribute fixes for markup sources.
//!
//! Removing or renaming an attribute in place must not leave stray
//! whitespace or a dangling delimiter, so the removal boundary depends on
//! how the attribute and its siblings are written: quoted, unquoted or
//! valueless. All boundary math happens at construction time against the
//! tag's final local structure; the later visit step only translates the
//! computed line/character positions into absolute offsets.

use crate::change::ChangeSet;
use crate::fix::{Fix, FixError, MarkupEventKind, MarkupNode, SearchCriteria, SourceRange};
use crate::markup::{AttrValue, Attribute, Tag};
use crate::position::{LineMap, MarkupPosition};

/// End boundary of an attribute occurrence: past the closing quote for
/// quoted values, exactly at the value end for unquoted values, at the
/// name end for valueless attributes.
fn attribute_end_boundary(attr: &Attribute) -> MarkupPosition {
    match &attr.value {
        AttrValue::DoubleQuoted(value) | AttrValue::SingleQuoted(value) => {
            MarkupPosition::new(value.end.line, value.end.character + 1)
        }
        AttrValue::Unquoted(value) => value.end,
        AttrValue::Valueless => corrected_name_end(attr),
    }
}

/// Name end with the single-character workaround applied: tag parsers are
/// known to misreport positions for valueless single-character names, so
/// the end is re-derived from the start.
fn corrected_name_end(attr: &Attribute) -> MarkupPosition {
    if matches!(attr.value, AttrValue::Valueless) && attr.name.text.len() == 1 {
        MarkupPosition::new(attr.name.start.line, attr.name.start.character + 1)
    } else {
        attr.name.end
    }
}

/// Fix to remove one attribute from a tag, consuming the whitespace that
/// separated it from its previous sibling (or from the tag name).
#[derive(Debug)]
pub struct RemoveAttributeFix {
    attribute: String,
    search_at: MarkupPosition,
    start_detail: MarkupPosition,
    end_detail: MarkupPosition,
    resolved: Option<SourceRange>,
}

impl RemoveAttributeFix {
    /// Build the fix for `tag.attributes[index]`. Boundary calculation
    /// happens here, against the final sibling structure; failure to
    /// determine a boundary is a construction error and the fix must not
    /// enter the candidate set.
    pub fn new(tag: &Tag, index: usize) -> Result<Self, FixError> {
        let attr = tag.attributes.get(index).ok_or_else(|| FixError::AttributeBoundary {
            boundary: "start",
            attribute: format!("#{index}"),
        })?;
        let (start_detail, end_detail) = removal_boundaries(tag, index)?;
        Ok(Self {
            attribute: attr.name.text.clone(),
            search_at: attr.name.start,
            start_detail,
            end_detail,
            resolved: None,
        })
    }
}

fn removal_boundaries(
    tag: &Tag,
    index: usize,
) -> Result<(MarkupPosition, MarkupPosition), FixError> {
    let attr = &tag.attributes[index];
    let previous = index.checked_sub(1).map(|i| &tag.attributes[i]);

    // Start at the previous sibling's end boundary so the separating
    // whitespace goes with the removed attribute; the first attribute
    // starts at the position just past the tag name.
    let mut start = match previous {
        Some(prev) => attribute_end_boundary(prev),
        None => tag.name.end,
    };
    let end = attribute_end_boundary(attr);

    if let Some(shifted) = zero_whitespace_start(tag, index) {
        start = shifted;
    }

    if start.line > end.line || (start.line == end.line && start.character > end.character) {
        return Err(FixError::AttributeBoundary {
            boundary: "end",
            attribute: attr.name.text.clone(),
        });
    }
    Ok((start, end))
}

/// Detect the zero-whitespace adjacency case (`attr="def"ignore=x`): the
/// next attribute's name starts immediately at this attribute's end
/// boundary. The start boundary then shifts one column right so exactly
/// one separator survives the removal. A quoted previous sibling needs no
/// shift; its closing quote already separates the tokens.
fn zero_whitespace_start(tag: &Tag, index: usize) -> Option<MarkupPosition> {
    let attr = &tag.attributes[index];
    let next = tag.attributes.get(index + 1)?;
    let end = attribute_end_boundary(attr);
    if next.name.start.line != end.line || next.name.start.character != end.character {
        return None;
    }

    match index.checked_sub(1).map(|i| &tag.attributes[i]) {
        None => Some(MarkupPosition::new(
            tag.name.end.line,
            tag.name.end.character + 1,
        )),
        Some(prev) => match &prev.value {
            AttrValue::Valueless => {
                let name_end = corrected_name_end(prev);
                Some(MarkupPosition::new(name_end.line, name_end.character + 1))
            }
            AttrValue::Unquoted(value) => {
                Some(MarkupPosition::new(value.end.line, value.end.character + 1))
            }
            AttrValue::DoubleQuoted(_) | AttrValue::SingleQuoted(_) => None,
        },
    }
}

impl Fix for RemoveAttributeFix {
    fn kind(&self) -> &'static str {
        "RemoveAttributeFix"
    }

    fn search_criteria(&self) -> Result<SearchCriteria, FixError> {
        Ok(SearchCriteria::Markup {
            event_kinds: vec![MarkupEventKind::Attribute],
            position: self.search_at,
        })
    }

    fn visit_markup_node(&mut self, _node: MarkupNode<'_>, lines: &LineMap) -> bool {
        self.resolved = Some(SourceRange::new(
            lines.offset_of(self.start_detail),
            lines.offset_of(self.end_detail),
        ));
        true
    }

    fn affected_range(&self) -> Option<SourceRange> {
        self.resolved
    }

    fn generate_changes(&self) -> Result<Vec<ChangeSet>, FixError> {
        let range = self.resolved.ok_or(FixError::PositionsNotResolved)?;
        Ok(vec![ChangeSet::Delete {
            start: range.start,
            end: range.end,
        }])
    }
}

/// Fix to rename an attribute. Only the name sub-range is touched; the
/// value and surrounding whitespace stay as they are.
#[derive(Debug)]
pub struct RenameAttributeFix {
    new_name: String,
    search_at: MarkupPosition,
    name_start: MarkupPosition,
    name_end: MarkupPosition,
    resolved: Option<SourceRange>,
}

impl RenameAttributeFix {
    pub fn new(attr: &Attribute, new_name: impl Into<String>) -> Self {
        Self {
            new_name: new_name.into(),
            search_at: attr.name.start,
            name_start: attr.name.start,
            name_end: corrected_name_end(attr),
            resolved: None,
        }
    }
}

impl Fix for RenameAttributeFix {
    fn kind(&self) -> &'static str {
        "RenameAttributeFix"
    }

    fn search_criteria(&self) -> Result<SearchCriteria, FixError> {
        Ok(SearchCriteria::Markup {
            event_kinds: vec![MarkupEventKind::Attribute],
            position: self.search_at,
        })
    }

    fn visit_markup_node(&mut self, _node: MarkupNode<'_>, lines: &LineMap) -> bool {
        self.resolved = Some(SourceRange::new(
            lines.offset_of(self.name_start),
            lines.offset_of(self.name_end),
        ));
        true
    }

    fn affected_range(&self) -> Option<SourceRange> {
        self.resolved
    }

    fn generate_changes(&self) -> Result<Vec<ChangeSet>, FixError> {
        let range = self.resolved.ok_or(FixError::PositionsNotResolved)?;
        Ok(vec![ChangeSet::Replace {
            start: range.start,
            end: range.end,
            value: self.new_name.clone(),
        }])
    }
}

/// Fix that rewrites an attribute's name and value together, emitting one
/// replace per sub-range. The affected range spans the whole occurrence
/// so conflict detection sees a single claim.
#[derive(Debug)]
pub struct RewriteAttributeFix {
    new_name: String,
    new_value: String,
    search_at: MarkupPosition,
    name_start: MarkupPosition,
    name_end: MarkupPosition,
    value_start: MarkupPosition,
    value_end: MarkupPosition,
    outer_end: MarkupPosition,
    resolved: Option<ResolvedRewrite>,
}

#[derive(Debug, Clone, Copy)]
struct ResolvedRewrite {
    name: SourceRange,
    value: SourceRange,
    outer: SourceRange,
}

impl RewriteAttributeFix {
    /// Requires an attribute that actually has a value.
    pub fn new(
        attr: &Attribute,
        new_name: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Result<Self, FixError> {
        let value = attr
            .value
            .text()
            .ok_or_else(|| FixError::MissingAttributeValue {
                attribute: attr.name.text.clone(),
            })?;
        Ok(Self {
            new_name: new_name.into(),
            new_value: new_value.into(),
            search_at: attr.name.start,
            name_start: attr.name.start,
            name_end: corrected_name_end(attr),
            value_start: value.start,
            value_end: value.end,
            outer_end: attribute_end_boundary(attr),
            resolved: None,
        })
    }
}

impl Fix for RewriteAttributeFix {
    fn kind(&self) -> &'static str {
        "RewriteAttributeFix"
    }

    fn search_criteria(&self) -> Result<SearchCriteria, FixError> {
        Ok(SearchCriteria::Markup {
            event_kinds: vec![MarkupEventKind::Attribute],
            position: self.search_at,
        })
    }

    fn visit_markup_node(&mut self, _node: MarkupNode<'_>, lines: &LineMap) -> bool {
        self.resolved = Some(ResolvedRewrite {
            name: SourceRange::new(
                lines.offset_of(self.name_start),
                lines.offset_of(self.name_end),
            ),
            value: SourceRange::new(
                lines.offset_of(self.value_start),
                lines.offset_of(self.value_end),
            ),
            outer: SourceRange::new(
                lines.offset_of(self.name_start),
                lines.offset_of(self.outer_end),
            ),
        });
        true
    }

    fn affected_range(&self) -> Option<SourceRange> {
        self.resolved.map(|r| r.outer)
    }

    fn generate_changes(&self) -> Result<Vec<ChangeSet>, FixError> {
        let resolved = self.resolved.ok_or(FixError::PositionsNotResolved)?;
        Ok(vec![
            ChangeSet::Replace {
                start: resolved.name.start,
                end: resolved.name.end,
                value: self.new_name.clone(),
            },
            ChangeSet::Replace {
                start: resolved.value.start,
                end: resolved.value.end,
                value: self.new_value.clone(),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::apply_change_set;
    use crate::markup::{scan, MarkupEvent};

    fn first_tag(content: &str) -> Tag {
        scan(content)
            .into_iter()
            .find_map(|event| match event {
                MarkupEvent::OpenTag(tag) => Some(tag),
                MarkupEvent::Attribute(_) => None,
            })
            .expect("no tag in test input")
    }

    fn apply_fix(content: &str, mut fix: impl Fix) -> String {
        let lines = LineMap::new(content);
        assert!(fix.visit_markup_node(
            MarkupNode::OpenTag(&first_tag(content)),
            &lines
        ));
        apply_change_set(content, fix.generate_changes().unwrap()).unwrap()
    }

    #[test]
    fn remove_only_attribute_leaves_no_whitespace() {
        let content = r#"<script remove="me">"#;
        let tag = first_tag(content);
        let fix = RemoveAttributeFix::new(&tag, 0).unwrap();
        assert_eq!(apply_fix(content, fix), "<script>");
    }

    #[test]
    fn remove_first_of_two_attributes() {
        let content = r#"<script remove="me" keep="me">"#;
        let tag = first_tag(content);
        let fix = RemoveAttributeFix::new(&tag, 0).unwrap();
        assert_eq!(apply_fix(content, fix), r#"<script keep="me">"#);
    }

    #[test]
    fn remove_last_attribute_keeps_neighbor_whitespace() {
        let content = r#"<script keep="me" remove="me">"#;
        let tag = first_tag(content);
        let fix = RemoveAttributeFix::new(&tag, 1).unwrap();
        assert_eq!(apply_fix(content, fix), r#"<script keep="me">"#);
    }

    #[test]
    fn remove_middle_attribute() {
        let content = r#"<script a="1" remove="me" b="2">"#;
        let tag = first_tag(content);
        let fix = RemoveAttributeFix::new(&tag, 1).unwrap();
        assert_eq!(apply_fix(content, fix), r#"<script a="1" b="2">"#);
    }

    #[test]
    fn remove_unquoted_attribute() {
        let content = "<script no-quotes=remove keep=\"me\">";
        let tag = first_tag(content);
        let fix = RemoveAttributeFix::new(&tag, 0).unwrap();
        assert_eq!(apply_fix(content, fix), "<script keep=\"me\">");
    }

    #[test]
    fn remove_valueless_attribute() {
        let content = "<script keep=\"me\" no-value>";
        let tag = first_tag(content);
        let fix = RemoveAttributeFix::new(&tag, 1).unwrap();
        assert_eq!(apply_fix(content, fix), "<script keep=\"me\">");
    }

    #[test]
    fn remove_attribute_after_valueless_sibling() {
        let content = "<script no-value remove=\"me\">";
        let tag = first_tag(content);
        let fix = RemoveAttributeFix::new(&tag, 1).unwrap();
        assert_eq!(apply_fix(content, fix), "<script no-value>");
    }

    #[test]
    fn remove_multi_line_attribute_consumes_leading_newline() {
        let content = "<script remove=\"me\"\n\tkeep=\"me\"\n\tremove2=\"me\">";
        let tag = first_tag(content);
        let fix = RemoveAttributeFix::new(&tag, 2).unwrap();
        assert_eq!(apply_fix(content, fix), "<script remove=\"me\"\n\tkeep=\"me\">");
    }

    #[test]
    fn remove_single_character_valueless_attribute() {
        let content = "<script keep=\"me\" ,>";
        let tag = first_tag(content);
        let fix = RemoveAttributeFix::new(&tag, 1).unwrap();
        assert_eq!(apply_fix(content, fix), "<script keep=\"me\">");
    }

    #[test]
    fn remove_first_attribute_with_zero_whitespace_neighbor() {
        let content = r#"<script attr="def"ignore=xyz>"#;
        let tag = first_tag(content);
        let fix = RemoveAttributeFix::new(&tag, 0).unwrap();
        assert_eq!(apply_fix(content, fix), "<script ignore=xyz>");
    }

    #[test]
    fn remove_zero_whitespace_neighbor_after_unquoted_sibling() {
        let content = r#"<script a=1 attr="def"ignore=xyz>"#;
        let tag = first_tag(content);
        let fix = RemoveAttributeFix::new(&tag, 1).unwrap();
        assert_eq!(apply_fix(content, fix), "<script a=1 ignore=xyz>");
    }

    #[test]
    fn remove_zero_whitespace_neighbor_after_valueless_sibling() {
        let content = r#"<script a attr="def"ignore=xyz>"#;
        let tag = first_tag(content);
        let fix = RemoveAttributeFix::new(&tag, 1).unwrap();
        assert_eq!(apply_fix(content, fix), "<script a ignore=xyz>");
    }

    #[test]
    fn rename_attribute_touches_only_the_name() {
        let content = r#"<script old-name="value">"#;
        let tag = first_tag(content);
        let fix = RenameAttributeFix::new(&tag.attributes[0], "new-name");
        assert_eq!(apply_fix(content, fix), r#"<script new-name="value">"#);
    }

    #[test]
    fn rename_single_character_valueless_attribute() {
        let content = "<script keep=\"me\" ,>";
        let tag = first_tag(content);
        let fix = RenameAttributeFix::new(&tag.attributes[1], "i-was-renamed");
        assert_eq!(apply_fix(content, fix), "<script keep=\"me\" i-was-renamed>");
    }

    #[test]
    fn rewrite_attribute_replaces_name_and_value() {
        let content = r#"<html animation="true">"#;
        let tag = first_tag(content);
        let fix =
            RewriteAttributeFix::new(&tag.attributes[0], "data-animation-mode", "full").unwrap();
        assert_eq!(apply_fix(content, fix), r#"<html data-animation-mode="full">"#);
    }

    #[test]
    fn rewrite_requires_a_value() {
        let content = "<script no-value>";
        let tag = first_tag(content);
        let err = RewriteAttributeFix::new(&tag.attributes[0], "x", "y").unwrap_err();
        assert!(matches!(err, FixError::MissingAttributeValue { .. }));
    }

    #[test]
    fn unresolved_fix_generates_no_changes() {
        let content = r#"<script remove="me">"#;
        let tag = first_tag(content);
        let fix = RemoveAttributeFix::new(&tag, 0).unwrap();
        assert!(matches!(
            fix.generate_changes(),
            Err(FixError::PositionsNotResolved)
        ));
    }

    #[test]
    fn out_of_range_index_is_a_construction_error() {
        let content = r#"<script keep="me">"#;
        let tag = first_tag(content);
        assert!(matches!(
            RemoveAttributeFix::new(&tag, 3),
            Err(FixError::AttributeBoundary { .. })
        ));
    }
}
