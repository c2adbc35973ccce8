//! Declarative fix plans.
//!
//! A plan file lists located corrections to apply to a tree of source
//! artifacts, one entry per fix, in the engine's own vocabulary
//! (attribute removal/rename/rewrite, JSON property removal, JSON value
//! replacement). The CLI loads plans, the applicator turns each entry
//! into a concrete fix and runs the normal engine pipeline over every
//! touched file.

mod applicator;
mod schema;

pub use applicator::{apply_plan, FixOutcome};
pub use schema::{
    Action, FixDefinition, Metadata, PlanConfig, ValidationError, ValidationIssue,
};

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("failed to read plan file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse plan file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Parse and validate a plan from JSON text.
pub fn load_from_str(text: &str) -> Result<PlanConfig, PlanError> {
    let config: PlanConfig = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate a plan file.
pub fn load_from_path(path: &Path) -> Result<PlanConfig, PlanError> {
    let text = std::fs::read_to_string(path).map_err(|source| PlanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&text)
}
