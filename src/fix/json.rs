//! Property fixes for source-mapped JSON manifests.
//!
//! JSON fixes resolve at construction time: the pointer map already
//! stores absolute byte offsets, so there is no search phase and no
//! position translation. All the reasoning is about which punctuation a
//! removal must take with it so the patched document stays valid JSON.

use crate::change::ChangeSet;
use crate::fix::{Fix, FixError, SearchCriteria, SourceRange};
use crate::json::{
    next_property_pointer, parent_pointer, previous_property_pointer, PointerMap,
};

/// Fix to remove the property a pointer names, together with exactly one
/// separating comma.
///
/// With `collapse_empty_parent` enabled, removing the only property of an
/// object removes the parent property instead — the direct parent only,
/// and never the document root. Otherwise the parent object is emptied in
/// place.
#[derive(Debug)]
pub struct RemoveJsonPropertyFix {
    range: SourceRange,
}

impl RemoveJsonPropertyFix {
    pub fn new(
        pointer: &str,
        pointers: &PointerMap,
        collapse_empty_parent: bool,
    ) -> Result<Self, FixError> {
        let range = removal_range(pointer, pointers, collapse_empty_parent)?;
        Ok(Self { range })
    }
}

fn removal_range(
    pointer: &str,
    pointers: &PointerMap,
    collapse_empty_parent: bool,
) -> Result<SourceRange, FixError> {
    let entry = pointers
        .get(pointer)
        .ok_or_else(|| FixError::PointerNotFound {
            pointer: pointer.to_string(),
        })?;
    let Some(key) = entry.key else {
        // The root and array elements are not properties.
        return Err(FixError::NonPropertyRemoval {
            pointer: pointer.to_string(),
        });
    };

    if let Some(previous) = previous_property_pointer(pointers, entry, pointer) {
        // Start at the end of the previous property to take the leading
        // comma with the removal.
        return Ok(SourceRange::new(previous.value_end.pos, entry.value_end.pos));
    }
    if let Some(next) = next_property_pointer(pointers, entry, pointer) {
        // End at the start of the next property's key to take the
        // trailing comma.
        let next_key = next.key.ok_or_else(|| FixError::PointerNotFound {
            pointer: pointer.to_string(),
        })?;
        return Ok(SourceRange::new(key.pos, next_key.pos));
    }

    // Only property of its parent.
    let parent = parent_pointer(pointer).ok_or_else(|| FixError::NonPropertyRemoval {
        pointer: pointer.to_string(),
    })?;
    let parent_entry = pointers
        .get(parent)
        .ok_or_else(|| FixError::ParentPointerNotFound {
            parent: parent.to_string(),
            pointer: pointer.to_string(),
        })?;

    if collapse_empty_parent && parent_entry.is_property() {
        // Remove the parent property itself; collapse applies one level
        // only, so the recursion runs without it.
        return removal_range(parent, pointers, false);
    }

    // Empty the parent object: delete everything strictly between its
    // braces.
    Ok(SourceRange::new(
        parent_entry.value.pos + 1,
        parent_entry.value_end.pos - 1,
    ))
}

impl Fix for RemoveJsonPropertyFix {
    fn kind(&self) -> &'static str {
        "RemoveJsonPropertyFix"
    }

    fn search_criteria(&self) -> Result<SearchCriteria, FixError> {
        Ok(SearchCriteria::None)
    }

    fn affected_range(&self) -> Option<SourceRange> {
        Some(self.range)
    }

    fn generate_changes(&self) -> Result<Vec<ChangeSet>, FixError> {
        Ok(vec![ChangeSet::Delete {
            start: self.range.start,
            end: self.range.end,
        }])
    }
}

/// Fix to replace the value a pointer names with a serialized JSON
/// literal. Targets exactly the value sub-range; key and punctuation are
/// untouched.
#[derive(Debug)]
pub struct ReplaceJsonValueFix {
    range: SourceRange,
    value: String,
}

impl ReplaceJsonValueFix {
    pub fn new(
        pointer: &str,
        pointers: &PointerMap,
        value: &serde_json::Value,
    ) -> Result<Self, FixError> {
        let entry = pointers
            .get(pointer)
            .ok_or_else(|| FixError::PointerNotFound {
                pointer: pointer.to_string(),
            })?;
        Ok(Self {
            range: SourceRange::new(entry.value.pos, entry.value_end.pos),
            value: serde_json::to_string(value)?,
        })
    }
}

impl Fix for ReplaceJsonValueFix {
    fn kind(&self) -> &'static str {
        "ReplaceJsonValueFix"
    }

    fn search_criteria(&self) -> Result<SearchCriteria, FixError> {
        Ok(SearchCriteria::None)
    }

    fn affected_range(&self) -> Option<SourceRange> {
        Some(self.range)
    }

    fn generate_changes(&self) -> Result<Vec<ChangeSet>, FixError> {
        Ok(vec![ChangeSet::Replace {
            start: self.range.start,
            end: self.range.end,
            value: self.value.clone(),
        }])
    }
}
