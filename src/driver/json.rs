//! JSON driver.
//!
//! JSON fixes carry absolute offsets from the moment they are
//! constructed against the pointer map, so there is no search pass:
//! the driver goes straight to conflict resolution and change
//! generation.

use crate::change::ChangeSet;
use crate::driver::collect_changes;
use crate::fix::Fix;

pub fn generate_changes_json(fixes: Vec<Box<dyn Fix>>) -> Vec<ChangeSet> {
    collect_changes(fixes)
}
