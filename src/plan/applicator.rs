//! Turn plan entries into concrete fixes and run the engine per file.

use crate::change::apply_change_set;
use crate::conflict::resolve_conflicts_by;
use crate::fix::{
    Fix, FixError, MarkupNode, RemoveAttributeFix, RemoveJsonPropertyFix, RenameAttributeFix,
    ReplaceJsonValueFix, RewriteAttributeFix,
};
use crate::json::build_pointer_map;
use crate::markup::{scan, MarkupEvent, Tag};
use crate::plan::{Action, FixDefinition, PlanConfig};
use crate::position::LineMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Per-fix result of applying a plan. A fix that finds nothing to change
/// is not a failure; re-running an already-applied plan reports
/// `NothingToDo` for every entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    Applied { file: PathBuf },
    NothingToDo { file: PathBuf, reason: String },
    Failed { file: PathBuf, reason: String },
}

/// Apply every fix in `config` against the tree rooted at `root`.
///
/// Files are processed independently: a failure in one file never stops
/// the rest of the plan. Within a file, fix construction failures are
/// per-entry, while an apply-time error fails the whole file's batch.
/// With `dry_run` the patched content is computed but nothing is
/// written.
pub fn apply_plan(config: &PlanConfig, root: &Path, dry_run: bool) -> Vec<(String, FixOutcome)> {
    // Group fixes by target file, preserving plan order.
    let mut groups: Vec<(&str, Vec<&FixDefinition>)> = Vec::new();
    for def in &config.fixes {
        match groups.iter_mut().find(|(file, _)| *file == def.file) {
            Some((_, defs)) => defs.push(def),
            None => groups.push((def.file.as_str(), vec![def])),
        }
    }

    let mut results = Vec::new();
    for (file, defs) in groups {
        let path = root.join(file);
        debug!(file = %path.display(), fixes = defs.len(), "applying plan entries");
        let outcomes = apply_file(&path, &defs, dry_run);
        for (def, outcome) in defs.iter().zip(outcomes) {
            results.push((def.id.clone(), outcome));
        }
    }
    results
}

fn apply_file(path: &Path, defs: &[&FixDefinition], dry_run: bool) -> Vec<FixOutcome> {
    let fail_all = |reason: &str| {
        defs.iter()
            .map(|_| FixOutcome::Failed {
                file: path.to_path_buf(),
                reason: reason.to_string(),
            })
            .collect::<Vec<_>>()
    };

    let markup_count = defs.iter().filter(|def| def.action.is_markup()).count();
    if markup_count != 0 && markup_count != defs.len() {
        return fail_all("plan mixes markup and JSON actions for one file");
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) => return fail_all(&format!("cannot read file: {error}")),
    };

    let mut outcomes: Vec<Option<FixOutcome>> = vec![None; defs.len()];
    let mut constructed: Vec<(usize, Box<dyn Fix>)> = Vec::new();

    if markup_count > 0 {
        let tags: Vec<Tag> = scan(&content)
            .into_iter()
            .filter_map(|event| match event {
                MarkupEvent::OpenTag(tag) => Some(tag),
                MarkupEvent::Attribute(_) => None,
            })
            .collect();
        let lines = LineMap::new(&content);

        for (slot, def) in defs.iter().enumerate() {
            match build_markup_fix(def, &tags) {
                Ok(Some((tag_idx, mut fix))) => {
                    fix.visit_markup_node(MarkupNode::OpenTag(&tags[tag_idx]), &lines);
                    constructed.push((slot, fix));
                }
                Ok(None) => {
                    outcomes[slot] = Some(FixOutcome::NothingToDo {
                        file: path.to_path_buf(),
                        reason: "no matching attribute".to_string(),
                    });
                }
                Err(error) => {
                    outcomes[slot] = Some(FixOutcome::Failed {
                        file: path.to_path_buf(),
                        reason: error.to_string(),
                    });
                }
            }
        }
    } else {
        let pointers = match build_pointer_map(&content) {
            Ok(pointers) => pointers,
            Err(error) => return fail_all(&format!("cannot map JSON document: {error}")),
        };

        for (slot, def) in defs.iter().enumerate() {
            match build_json_fix(def, &pointers) {
                Ok(fix) => constructed.push((slot, fix)),
                Err(FixError::PointerNotFound { pointer }) => {
                    outcomes[slot] = Some(FixOutcome::NothingToDo {
                        file: path.to_path_buf(),
                        reason: format!("pointer '{pointer}' not present"),
                    });
                }
                Err(error) => {
                    outcomes[slot] = Some(FixOutcome::Failed {
                        file: path.to_path_buf(),
                        reason: error.to_string(),
                    });
                }
            }
        }
    }

    let surviving = resolve_conflicts_by(
        constructed,
        |(_, fix)| fix.affected_range(),
        |(slot, _)| defs[*slot].id.as_str(),
    );
    let surviving_slots: Vec<usize> = surviving.iter().map(|(slot, _)| *slot).collect();
    for (slot, outcome) in outcomes.iter_mut().enumerate() {
        if outcome.is_none() && !surviving_slots.contains(&slot) {
            *outcome = Some(FixOutcome::NothingToDo {
                file: path.to_path_buf(),
                reason: "overlaps another fix".to_string(),
            });
        }
    }

    let mut changes = Vec::new();
    let mut generated_slots = Vec::new();
    for (slot, fix) in &surviving {
        match fix.generate_changes() {
            Ok(generated) => {
                changes.extend(generated);
                generated_slots.push(*slot);
            }
            Err(error) => {
                outcomes[*slot] = Some(FixOutcome::Failed {
                    file: path.to_path_buf(),
                    reason: error.to_string(),
                });
            }
        }
    }

    if !changes.is_empty() {
        match apply_change_set(&content, changes) {
            Ok(patched) if patched == content => {
                for slot in generated_slots {
                    outcomes[slot] = Some(FixOutcome::NothingToDo {
                        file: path.to_path_buf(),
                        reason: "already applied".to_string(),
                    });
                }
            }
            Ok(patched) => {
                let write_failed = if !dry_run {
                    atomic_write(path, patched.as_bytes()).err()
                } else {
                    None
                };
                for slot in generated_slots {
                    outcomes[slot] = Some(match &write_failed {
                        None => FixOutcome::Applied {
                            file: path.to_path_buf(),
                        },
                        Some(error) => FixOutcome::Failed {
                            file: path.to_path_buf(),
                            reason: format!("cannot write file: {error}"),
                        },
                    });
                }
            }
            Err(error) => {
                // An apply-time error means the batch as a whole is
                // unsound; no partial result is written.
                for slot in generated_slots {
                    outcomes[slot] = Some(FixOutcome::Failed {
                        file: path.to_path_buf(),
                        reason: error.to_string(),
                    });
                }
            }
        }
    }

    outcomes
        .into_iter()
        .map(|outcome| {
            outcome.unwrap_or(FixOutcome::NothingToDo {
                file: path.to_path_buf(),
                reason: "no changes generated".to_string(),
            })
        })
        .collect()
}

/// Find the first tag matching the action's element/attribute pair and
/// build the corresponding fix. `Ok(None)` means nothing in this file
/// matches, which is not an error.
fn build_markup_fix(
    def: &FixDefinition,
    tags: &[Tag],
) -> Result<Option<(usize, Box<dyn Fix>)>, FixError> {
    let (element, attribute) = match &def.action {
        Action::RemoveAttribute { element, attribute }
        | Action::RenameAttribute {
            element, attribute, ..
        }
        | Action::RewriteAttribute {
            element, attribute, ..
        } => (element, attribute),
        Action::RemoveJsonProperty { .. } | Action::ReplaceJsonValue { .. } => return Ok(None),
    };

    for (tag_idx, tag) in tags.iter().enumerate() {
        if tag.name.text != *element {
            continue;
        }
        let Some(attr_idx) = tag
            .attributes
            .iter()
            .position(|attr| attr.name.text == *attribute)
        else {
            continue;
        };

        let fix: Box<dyn Fix> = match &def.action {
            Action::RemoveAttribute { .. } => Box::new(RemoveAttributeFix::new(tag, attr_idx)?),
            Action::RenameAttribute { new_name, .. } => Box::new(RenameAttributeFix::new(
                &tag.attributes[attr_idx],
                new_name.clone(),
            )),
            Action::RewriteAttribute {
                new_name,
                new_value,
                ..
            } => Box::new(RewriteAttributeFix::new(
                &tag.attributes[attr_idx],
                new_name.clone(),
                new_value.clone(),
            )?),
            Action::RemoveJsonProperty { .. } | Action::ReplaceJsonValue { .. } => {
                return Ok(None)
            }
        };
        return Ok(Some((tag_idx, fix)));
    }

    Ok(None)
}

fn build_json_fix(
    def: &FixDefinition,
    pointers: &crate::json::PointerMap,
) -> Result<Box<dyn Fix>, FixError> {
    match &def.action {
        Action::RemoveJsonProperty {
            pointer,
            collapse_empty_parent,
        } => Ok(Box::new(RemoveJsonPropertyFix::new(
            pointer,
            pointers,
            *collapse_empty_parent,
        )?)),
        Action::ReplaceJsonValue { pointer, value } => {
            Ok(Box::new(ReplaceJsonValueFix::new(pointer, pointers, value)?))
        }
        Action::RemoveAttribute { .. }
        | Action::RenameAttribute { .. }
        | Action::RewriteAttribute { .. } => Err(FixError::PointerNotFound {
            pointer: String::new(),
        }),
    }
}

/// Atomic file write: tempfile in the same directory, fsync, rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|error| error.error)?;
    Ok(())
}
