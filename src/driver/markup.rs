//! Markup driver: one pass over the tag-stream events.

use crate::change::ChangeSet;
use crate::driver::collect_changes;
use crate::fix::{Fix, MarkupEventKind, MarkupNode, SearchCriteria};
use crate::markup::MarkupEvent;
use crate::position::{LineMap, MarkupPosition};
use tracing::warn;

struct PendingFix {
    event_kinds: Vec<MarkupEventKind>,
    position: MarkupPosition,
    fix: Box<dyn Fix>,
}

/// Resolve `fixes` against the document's markup events and return the
/// surviving change batch.
///
/// Fixes are matched by event kind and the event token's start position.
/// Several fixes may race for the same event; they are offered it in
/// registration order and each decides for itself whether it matched.
pub fn generate_changes_markup(
    content: &str,
    events: impl IntoIterator<Item = MarkupEvent>,
    fixes: Vec<Box<dyn Fix>>,
) -> Vec<ChangeSet> {
    let lines = LineMap::new(content);

    let mut pending: Vec<PendingFix> = Vec::new();
    let mut matched: Vec<Box<dyn Fix>> = Vec::new();

    for fix in fixes {
        match fix.search_criteria() {
            Ok(SearchCriteria::Markup {
                event_kinds,
                position,
            }) => pending.push(PendingFix {
                event_kinds,
                position,
                fix,
            }),
            // Already resolved at construction; nothing to search for.
            Ok(SearchCriteria::None) => matched.push(fix),
            Ok(SearchCriteria::Script { .. }) => {
                warn!(
                    fix = fix.kind(),
                    "skipping script-searched fix in markup driver"
                );
            }
            Err(error) => {
                warn!(fix = fix.kind(), %error, "skipping fix without search criteria");
            }
        }
    }

    for event in events {
        if pending.is_empty() {
            break;
        }
        let (kind, position, node) = match &event {
            MarkupEvent::Attribute(attr) => (
                MarkupEventKind::Attribute,
                attr.name.start,
                MarkupNode::Attribute(attr),
            ),
            MarkupEvent::OpenTag(tag) => (
                MarkupEventKind::OpenTag,
                tag.open_start,
                MarkupNode::OpenTag(tag),
            ),
        };

        let mut idx = 0;
        while idx < pending.len() {
            let candidate = &mut pending[idx];
            if candidate.event_kinds.contains(&kind)
                && candidate.position == position
                && candidate.fix.visit_markup_node(node, &lines)
            {
                matched.push(pending.remove(idx).fix);
            } else {
                idx += 1;
            }
        }
    }

    collect_changes(matched)
}
