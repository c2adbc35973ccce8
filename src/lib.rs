//! uifix: autofix engine for UI framework source artifacts
//!
//! Turns lint findings over script controllers, XML views, HTML bootstrap
//! pages and JSON application manifests into located text edits, and
//! applies them safely.
//!
//! # Architecture
//!
//! Every correction compiles down to a single primitive: [`ChangeSet`], a
//! located insert/replace/delete addressed by byte offsets into the
//! *original* document. Intelligence lives in range acquisition — each
//! [`Fix`] knows how to find its exact boundaries in its source format —
//! not in application. The pipeline per document is:
//!
//! 1. rules attach [`Fix`] values to their lint messages;
//! 2. a per-format driver makes one pass over the document's structural
//!    events and lets each fix capture its offsets;
//! 3. the conflict resolver discards fixes whose ranges overlap a
//!    higher-precedence fix;
//! 4. [`apply_change_set`] patches the text back-to-front so no edit ever
//!    observes another edit's shift.
//!
//! # Safety
//!
//! - All offsets address the pristine original content; batches are
//!   order-independent.
//! - Overlapping range edits are rejected at apply time; the resolver
//!   must have eliminated them first.
//! - A failing fix is skipped, never applied half-resolved; an apply-time
//!   error aborts the whole document.
//!
//! # Example
//!
//! ```
//! use uifix::{apply_change_set, ChangeSet};
//!
//! let patched = apply_change_set(
//!     "Hello world!",
//!     vec![ChangeSet::Insert {
//!         start: 5,
//!         value: " beautiful".to_string(),
//!     }],
//! )
//! .unwrap();
//! assert_eq!(patched, "Hello beautiful world!");
//! ```

pub mod change;
pub mod conflict;
pub mod driver;
pub mod fix;
pub mod json;
pub mod markup;
pub mod metadata;
pub mod plan;
pub mod position;
pub mod script;

// Re-exports
pub use change::{apply_change_set, ApplyError, ChangeSet};
pub use conflict::{resolve_conflicts, resolve_conflicts_by};
pub use driver::{
    autofix_document, generate_changes_json, generate_changes_markup, generate_changes_script,
    LintMessage, StructuralEvents,
};
pub use fix::{
    Fix, FixError, MarkupEventKind, MarkupNode, QualifyHandlerFix, RemoveAttributeFix,
    RemoveJsonPropertyFix, RenameAttributeFix, ReplaceJsonValueFix, ReplaceNodeFix,
    RewriteAttributeFix, SearchCriteria, SourceRange,
};
pub use json::{build_pointer_map, JsonMapError, PointerEntry, PointerMap};
pub use markup::{scan, AttrValue, Attribute, MarkupEvent, SpanText, Tag};
pub use metadata::ScriptMetadataIndex;
pub use position::{LineMap, MarkupPosition, ScriptPosition};
pub use script::ScriptNode;
