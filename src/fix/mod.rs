//! The fix contract: how a located source correction describes itself.
//!
//! Every concrete fix goes through the same two phases. It is constructed
//! by the rule layer from whatever parse artifacts the rule had in hand,
//! and later — during the autofix scan over the document's structural
//! events — it is *resolved*: handed the matching event so it can capture
//! absolute byte offsets. Resolution state is a single `Option` assigned
//! exactly once; an unresolved fix produces no changes and never reaches
//! the patch applier.
//!
//! Fix-level failures are local: the driver logs and discards the fix and
//! the rest of the batch proceeds.

pub mod json;
pub mod markup;
pub mod script;

pub use json::{RemoveJsonPropertyFix, ReplaceJsonValueFix};
pub use markup::{RemoveAttributeFix, RenameAttributeFix, RewriteAttributeFix};
pub use script::{QualifyHandlerFix, ReplaceNodeFix};

use crate::change::ChangeSet;
use crate::markup::{Attribute, Tag};
use crate::position::{LineMap, MarkupPosition, ScriptPosition};
use crate::script::ScriptNode;
use thiserror::Error;

/// Resolved `[start, end)` byte range a fix will touch, used for conflict
/// detection before any change is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRange {
    pub start: usize,
    pub end: usize,
}

impl SourceRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &SourceRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely within this range (not necessarily
    /// strictly).
    pub fn contains(&self, other: &SourceRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[derive(Error, Debug)]
pub enum FixError {
    #[error("start and end position are not defined")]
    PositionsNotResolved,

    #[error("position for search is not defined")]
    SearchPositionNotDefined,

    #[error("could not determine the {boundary} boundary for attribute '{attribute}'")]
    AttributeBoundary {
        boundary: &'static str,
        attribute: String,
    },

    #[error("attribute '{attribute}' has no value to rewrite")]
    MissingAttributeValue { attribute: String },

    #[error("Cannot find JSON pointer: '{pointer}'")]
    PointerNotFound { pointer: String },

    #[error("Unsupported removal of non-property value: '{pointer}'")]
    NonPropertyRemoval { pointer: String },

    #[error("Cannot find parent JSON pointer: '{parent}' (for '{pointer}')")]
    ParentPointerNotFound { parent: String, pointer: String },

    #[error("replacement value is not serializable: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Which markup events a fix wants delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupEventKind {
    OpenTag,
    Attribute,
}

/// What a fix needs from the structural scan in order to resolve itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    /// Match markup events whose token starts at this 0-based position.
    Markup {
        event_kinds: Vec<MarkupEventKind>,
        position: MarkupPosition,
    },
    /// Match script AST nodes of one of these kinds starting at this
    /// 1-based position.
    Script {
        node_kinds: Vec<String>,
        position: ScriptPosition,
    },
    /// Already resolved at construction; no scan needed.
    None,
}

/// A matched markup event delivered to a fix's visit operation.
#[derive(Debug, Clone, Copy)]
pub enum MarkupNode<'a> {
    OpenTag(&'a Tag),
    Attribute(&'a Attribute),
}

/// A located, format-aware source correction.
///
/// Object-safe so heterogeneous fixes can ride on lint messages. The
/// default visit implementations report "did not match"; each source
/// kind's fixes override the visit they support.
pub trait Fix {
    /// Short name used in skip/discard log lines.
    fn kind(&self) -> &'static str;

    /// How the structural scan should locate this fix.
    fn search_criteria(&self) -> Result<SearchCriteria, FixError>;

    /// Deliver a matched markup event. Returns whether the fix
    /// matched/completed here.
    fn visit_markup_node(&mut self, node: MarkupNode<'_>, lines: &LineMap) -> bool {
        let _ = (node, lines);
        false
    }

    /// Deliver a matched script AST node. Returns whether the fix
    /// matched/completed here.
    fn visit_script_node(&mut self, node: &ScriptNode, content: &str) -> bool {
        let _ = (node, content);
        false
    }

    /// The resolved range this fix will touch, or `None` while
    /// unresolved.
    fn affected_range(&self) -> Option<SourceRange>;

    /// Produce the change descriptors for this fix. Fails if required
    /// positions were never resolved; such a fix must be discarded, not
    /// applied.
    fn generate_changes(&self) -> Result<Vec<ChangeSet>, FixError>;
}
