//! The fundamental edit primitive: a located insert, replace, or delete,
//! plus the batch applier that turns a set of them into patched text.
//!
//! All higher-level operations (attribute removal, manifest property
//! removal, handler qualification) compile down to [`ChangeSet`] values.
//! Intelligence lives in range acquisition, not in application.
//!
//! Every offset is a byte offset into the *original* document content.
//! Applying a batch never requires one change to know about another
//! change's shift: the applier processes changes from the end of the
//! document backwards, so earlier offsets stay valid throughout.

use thiserror::Error;

/// One atomic source edit, anchored to original-content byte offsets.
///
/// `end` is exclusive. Values are immutable once created and consumed
/// exactly once by [`apply_change_set`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a ChangeSet does nothing until applied"]
pub enum ChangeSet {
    Insert { start: usize, value: String },
    Replace { start: usize, end: usize, value: String },
    Delete { start: usize, end: usize },
}

impl ChangeSet {
    pub fn start(&self) -> usize {
        match self {
            ChangeSet::Insert { start, .. }
            | ChangeSet::Replace { start, .. }
            | ChangeSet::Delete { start, .. } => *start,
        }
    }

    /// Exclusive end of the affected range; for inserts this equals the
    /// start.
    pub fn end(&self) -> usize {
        match self {
            ChangeSet::Insert { start, .. } => *start,
            ChangeSet::Replace { end, .. } | ChangeSet::Delete { end, .. } => *end,
        }
    }

    fn is_insert(&self) -> bool {
        matches!(self, ChangeSet::Insert { .. })
    }
}

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("invalid byte range [{start}, {end}) in content of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("offset {offset} is not a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("zero-length replace at offset {start}; use an insert instead")]
    ZeroLengthReplace { start: usize },

    #[error("overlapping changes: [{first_start}, {first_end}) and [{second_start}, {second_end})")]
    OverlappingChanges {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },
}

/// Apply a batch of changes to `content` and return the patched text.
///
/// The batch may arrive in any order. Guarantees:
///
/// - every change is interpreted against original-content offsets;
/// - multiple inserts at the same offset apply in the order supplied;
/// - a replace or delete starting at an offset is applied before an insert
///   at that offset, so inserted text is never consumed by an adjacent
///   range edit;
/// - a zero-length delete is a no-op;
/// - a zero-length replace is rejected ([`ApplyError::ZeroLengthReplace`]);
/// - overlapping replace/delete ranges are rejected
///   ([`ApplyError::OverlappingChanges`]) — overlap must have been
///   eliminated by the conflict resolver before this point.
///
/// Total and deterministic: the same batch against the same content always
/// produces the same output or the same error.
pub fn apply_change_set(content: &str, changes: Vec<ChangeSet>) -> Result<String, ApplyError> {
    let len = content.len();

    for change in &changes {
        let (start, end) = (change.start(), change.end());
        if start > end || end > len {
            return Err(ApplyError::InvalidRange { start, end, len });
        }
        if !content.is_char_boundary(start) {
            return Err(ApplyError::NotCharBoundary { offset: start });
        }
        if !content.is_char_boundary(end) {
            return Err(ApplyError::NotCharBoundary { offset: end });
        }
        if let ChangeSet::Replace { start, end, .. } = change {
            if start == end {
                return Err(ApplyError::ZeroLengthReplace { start: *start });
            }
        }
    }

    // Non-empty ranges must not overlap. Inserts and zero-length deletes
    // occupy no range and are exempt.
    let mut ranges: Vec<(usize, usize)> = changes
        .iter()
        .filter(|c| !c.is_insert() && c.start() < c.end())
        .map(|c| (c.start(), c.end()))
        .collect();
    ranges.sort_unstable();
    for pair in ranges.windows(2) {
        let ((a_start, a_end), (b_start, b_end)) = (pair[0], pair[1]);
        if a_end > b_start {
            return Err(ApplyError::OverlappingChanges {
                first_start: a_start,
                first_end: a_end,
                second_start: b_start,
                second_end: b_end,
            });
        }
    }

    // Process back-to-front so original offsets stay valid. At a shared
    // start offset, range edits go first and inserts run in reverse supply
    // order; both rules exist so that the first-supplied insert ends up
    // leftmost and never inside a removed range.
    let mut order: Vec<usize> = (0..changes.len()).collect();
    order.sort_by(|&a, &b| {
        let (ca, cb) = (&changes[a], &changes[b]);
        cb.start()
            .cmp(&ca.start())
            .then_with(|| ca.is_insert().cmp(&cb.is_insert()))
            .then_with(|| {
                if ca.is_insert() {
                    b.cmp(&a)
                } else {
                    a.cmp(&b)
                }
            })
    });

    let mut patched = content.to_string();
    for idx in order {
        match &changes[idx] {
            ChangeSet::Insert { start, value } => {
                patched.insert_str(*start, value);
            }
            ChangeSet::Replace { start, end, value } => {
                patched.replace_range(*start..*end, value);
            }
            ChangeSet::Delete { start, end } => {
                patched.replace_range(*start..*end, "");
            }
        }
    }

    Ok(patched)
}
