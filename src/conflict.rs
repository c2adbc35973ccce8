//! Conflict resolution between matched fixes.
//!
//! Two resolved fixes whose affected ranges overlap cannot both generate
//! changes; the patch applier treats overlapping ranges as a programming
//! error. This pass runs after the structural scan and before change
//! generation, and guarantees that no two surviving fixes overlap.
//!
//! Tie-break policy (explicit, covered by tests): a fix whose range
//! strictly contains a competitor's range wins, because the outer fix
//! subsumes the inner edit; in every other case, including identical
//! ranges, the first-registered fix wins.

use crate::fix::{Fix, SourceRange};
use tracing::debug;

/// Reduce `fixes` (in registration order) to a set with pairwise
/// non-overlapping affected ranges. Fixes that never resolved a range are
/// dropped here as well.
pub fn resolve_conflicts(fixes: Vec<Box<dyn Fix>>) -> Vec<Box<dyn Fix>> {
    resolve_conflicts_by(fixes, |fix| fix.affected_range(), |fix| fix.kind())
}

/// Generic form of [`resolve_conflicts`] for callers that carry extra
/// state (an id, a report slot) alongside each fix.
pub fn resolve_conflicts_by<T>(
    items: Vec<T>,
    range_of: impl Fn(&T) -> Option<SourceRange>,
    label_of: impl Fn(&T) -> &str,
) -> Vec<T> {
    let mut kept: Vec<(SourceRange, T)> = Vec::new();

    for item in items {
        let Some(range) = range_of(&item) else {
            debug!(fix = label_of(&item), "dropping fix without a resolved range");
            continue;
        };

        let overlapping: Vec<usize> = kept
            .iter()
            .enumerate()
            .filter(|(_, (kept_range, _))| kept_range.overlaps(&range))
            .map(|(idx, _)| idx)
            .collect();

        if overlapping.is_empty() {
            kept.push((range, item));
        } else if overlapping
            .iter()
            .all(|&idx| range.contains(&kept[idx].0) && !kept[idx].0.contains(&range))
        {
            // Outer fix wins: it subsumes every overlapping kept range.
            for &idx in overlapping.iter().rev() {
                let (lost, loser) = &kept[idx];
                debug!(
                    fix = label_of(loser),
                    start = lost.start,
                    end = lost.end,
                    "discarding fix contained in a wider one"
                );
                kept.remove(idx);
            }
            kept.push((range, item));
        } else {
            debug!(
                fix = label_of(&item),
                start = range.start,
                end = range.end,
                "discarding fix overlapping an earlier one"
            );
        }
    }

    kept.into_iter().map(|(_, item)| item).collect()
}
