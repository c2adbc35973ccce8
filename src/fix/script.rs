//! Fixes resolved against the script front end's AST, or informed by
//! cross-file script metadata.

use crate::change::ChangeSet;
use crate::fix::{Fix, FixError, MarkupEventKind, MarkupNode, SearchCriteria, SourceRange};
use crate::metadata::ScriptMetadataIndex;
use crate::position::{LineMap, ScriptPosition};
use crate::script::ScriptNode;

/// General-source fix: replace the full text of one AST node.
///
/// The rule layer knows the node's kind and 1-based position; the script
/// driver's scan delivers the node itself, and this fix captures its byte
/// range.
#[derive(Debug)]
pub struct ReplaceNodeFix {
    node_kinds: Vec<String>,
    position: ScriptPosition,
    new_text: String,
    resolved: Option<SourceRange>,
}

impl ReplaceNodeFix {
    pub fn new<I, S>(node_kinds: I, position: ScriptPosition, new_text: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            node_kinds: node_kinds.into_iter().map(Into::into).collect(),
            position,
            new_text: new_text.into(),
            resolved: None,
        }
    }
}

impl Fix for ReplaceNodeFix {
    fn kind(&self) -> &'static str {
        "ReplaceNodeFix"
    }

    fn search_criteria(&self) -> Result<SearchCriteria, FixError> {
        Ok(SearchCriteria::Script {
            node_kinds: self.node_kinds.clone(),
            position: self.position,
        })
    }

    fn visit_script_node(&mut self, node: &ScriptNode, _content: &str) -> bool {
        self.resolved = Some(SourceRange::new(node.start, node.end));
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
            value: self.new_text.clone(),
        }])
    }
}

/// Fix that qualifies an event-handler reference in a view by inserting a
/// leading `.` before the handler name, marking it as a controller
/// method.
///
/// The handler is only qualified when the owning controller actually
/// declares the method; that check runs against the cross-file metadata
/// index before the markup scan, via [`QualifyHandlerFix::verify_handler`].
#[derive(Debug)]
pub struct QualifyHandlerFix {
    handler_name: String,
    controller_name: String,
    source_position: Option<ScriptPosition>,
    method_in_controller: bool,
    resolved: Option<SourceRange>,
}

impl QualifyHandlerFix {
    pub fn new(
        handler_name: impl Into<String>,
        controller_name: impl Into<String>,
        source_position: Option<ScriptPosition>,
    ) -> Self {
        Self {
            handler_name: handler_name.into(),
            controller_name: controller_name.into(),
            source_position,
            method_in_controller: false,
            resolved: None,
        }
    }

    /// Look the handler up on the owning controller. Without a controller
    /// name there is nothing to resolve against and the fix stays
    /// unverified.
    pub fn verify_handler(&mut self, index: &ScriptMetadataIndex, view_path: &str) {
        if self.controller_name.is_empty() {
            return;
        }
        self.method_in_controller =
            index.method_exists(&self.controller_name, view_path, &self.handler_name);
    }
}

impl Fix for QualifyHandlerFix {
    fn kind(&self) -> &'static str {
        "QualifyHandlerFix"
    }

    fn search_criteria(&self) -> Result<SearchCriteria, FixError> {
        let position = self
            .source_position
            .ok_or(FixError::SearchPositionNotDefined)?;
        Ok(SearchCriteria::Markup {
            event_kinds: vec![MarkupEventKind::Attribute],
            position: position.to_markup(),
        })
    }

    fn visit_markup_node(&mut self, node: MarkupNode<'_>, lines: &LineMap) -> bool {
        if !self.method_in_controller {
            return false;
        }
        let MarkupNode::Attribute(attr) = node else {
            return false;
        };
        let Some(value) = attr.value.text() else {
            return false;
        };
        let start = lines.offset_of(value.start);
        self.resolved = Some(SourceRange::new(start, start + 1));
        true
    }

    fn affected_range(&self) -> Option<SourceRange> {
        self.resolved
    }

    fn generate_changes(&self) -> Result<Vec<ChangeSet>, FixError> {
        let range = self.resolved.ok_or(FixError::PositionsNotResolved)?;
        Ok(vec![ChangeSet::Insert {
            start: range.start,
            value: ".".to_string(),
        }])
    }
}
