//! Per-format orchestration: feeding structural events to fixes and
//! collecting the resulting changes.
//!
//! One driver exists per source kind. Each makes a single pass over its
//! document's event stream; fixes accumulate during the pass and are only
//! finalized after the stream completes. Dispatch order over pending
//! fixes is registration order, so resolution is deterministic even when
//! several fixes compete for the same event.
//!
//! Error policy: a failing fix is logged and skipped, never fatal to the
//! batch; an apply-time error aborts the whole document, because a
//! partially applied batch cannot be trusted.

mod json;
mod markup;
mod script;

pub use json::generate_changes_json;
pub use markup::generate_changes_markup;
pub use script::generate_changes_script;

use crate::change::{apply_change_set, ApplyError, ChangeSet};
use crate::fix::Fix;
use crate::markup::MarkupEvent;
use crate::position::ScriptPosition;
use crate::script::ScriptNode;
use tracing::{debug, warn};

/// One finding reported by the rule layer. The fix, when present, is the
/// only part the autofix engine consumes; everything else is reporting
/// payload.
pub struct LintMessage {
    pub rule: String,
    pub position: ScriptPosition,
    pub args: serde_json::Map<String, serde_json::Value>,
    pub fix: Option<Box<dyn Fix>>,
}

impl LintMessage {
    pub fn new(rule: impl Into<String>, position: ScriptPosition) -> Self {
        Self {
            rule: rule.into(),
            position,
            args: serde_json::Map::new(),
            fix: None,
        }
    }

    pub fn with_fix(mut self, fix: Box<dyn Fix>) -> Self {
        self.fix = Some(fix);
        self
    }
}

/// The structural event stream for one document, in that document's
/// native shape. Markup events come from the tag scanner, script nodes
/// from the external compiler front end; JSON fixes carry their offsets
/// already and need no stream.
pub enum StructuralEvents {
    Markup(Vec<MarkupEvent>),
    Script(Vec<ScriptNode>),
    Json,
}

/// Run the full autofix pipeline for one document: collect the fixes
/// riding on `messages`, resolve them against the event stream, eliminate
/// conflicts, and apply the surviving changes.
///
/// Returns `Ok(None)` when no fix produced a change (nothing to write).
/// Fix-level failures are logged and skipped; only apply-time errors
/// propagate.
pub fn autofix_document(
    content: &str,
    events: StructuralEvents,
    messages: Vec<LintMessage>,
) -> Result<Option<String>, ApplyError> {
    let fixes: Vec<Box<dyn Fix>> = messages
        .into_iter()
        .filter_map(|message| message.fix)
        .collect();
    if fixes.is_empty() {
        return Ok(None);
    }
    debug!(count = fixes.len(), "collected fix candidates");

    let changes = match events {
        StructuralEvents::Markup(events) => generate_changes_markup(content, events, fixes),
        StructuralEvents::Script(nodes) => generate_changes_script(content, nodes, fixes),
        StructuralEvents::Json => generate_changes_json(fixes),
    };
    if changes.is_empty() {
        return Ok(None);
    }

    apply_change_set(content, changes).map(Some)
}

/// Shared tail of every driver: conflict resolution followed by change
/// generation, with failing fixes logged and skipped.
pub(crate) fn collect_changes(matched: Vec<Box<dyn Fix>>) -> Vec<ChangeSet> {
    let surviving = crate::conflict::resolve_conflicts(matched);
    let mut changes = Vec::new();
    for fix in surviving {
        match fix.generate_changes() {
            Ok(generated) => changes.extend(generated),
            Err(error) => {
                warn!(fix = fix.kind(), %error, "skipping fix that failed to generate changes");
            }
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix::RemoveJsonPropertyFix;
    use crate::json::build_pointer_map;

    #[test]
    fn autofix_document_with_no_fixes_changes_nothing() {
        let content = r#"{ "a": 1 }"#;
        let messages = vec![LintMessage::new("no-deprecated-api", ScriptPosition::new(1, 1))];
        let result = autofix_document(content, StructuralEvents::Json, messages).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn autofix_document_applies_json_fix() {
        let content = r#"{ "before": true, "text": "Hello World" }"#;
        let map = build_pointer_map(content).unwrap();
        let fix = RemoveJsonPropertyFix::new("/text", &map, false).unwrap();
        let messages = vec![
            LintMessage::new("no-deprecated-property", ScriptPosition::new(1, 19))
                .with_fix(Box::new(fix)),
        ];
        let result = autofix_document(content, StructuralEvents::Json, messages)
            .unwrap()
            .unwrap();
        assert_eq!(result, r#"{ "before": true }"#);
    }
}
