//! Cross-file metadata index for script sources.
//!
//! Some fixes need to know facts about *other* compiled files — typically
//! whether a controller declares a given handler method. The host builds
//! this index once per compilation batch and passes it by reference into
//! fix resolution; it is never mutated afterwards and never global.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
pub struct ScriptMetadataIndex {
    paths_by_controller: BTreeMap<String, BTreeSet<String>>,
    methods_by_path: BTreeMap<String, BTreeSet<String>>,
}

impl ScriptMetadataIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one controller declaration. The same controller name may be
    /// declared in several files (same local name under different
    /// namespaces); all of them are kept and disambiguated per lookup.
    pub fn record_controller<I, S>(&mut self, name: &str, path: &str, methods: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths_by_controller
            .entry(name.to_string())
            .or_default()
            .insert(path.to_string());
        self.methods_by_path
            .entry(path.to_string())
            .or_default()
            .extend(methods.into_iter().map(Into::into));
    }

    /// Whether `controller` declares `method`, as seen from the document
    /// at `from_path`. Dotted names check the full member chain as
    /// recorded by the host.
    pub fn method_exists(&self, controller: &str, from_path: &str, method: &str) -> bool {
        let Some(paths) = self.paths_by_controller.get(controller) else {
            return false;
        };
        let Some(path) = closest_path(paths, from_path) else {
            return false;
        };
        self.methods_by_path
            .get(path)
            .is_some_and(|methods| methods.contains(method))
    }
}

/// Pick the declaration path closest to `from_path` by longest common
/// `/`-separated prefix. If several candidates tie on a non-zero prefix
/// length the lookup is ambiguous and resolves to nothing.
fn closest_path<'a>(paths: &'a BTreeSet<String>, from_path: &str) -> Option<&'a String> {
    if paths.is_empty() {
        return None;
    }
    if paths.len() == 1 {
        return paths.iter().next();
    }

    let from_chunks: Vec<&str> = from_path.split('/').collect();
    let mut longest = 0;
    let mut closest: Option<&String> = None;
    let mut tied = false;

    for path in paths {
        let common = path
            .split('/')
            .zip(&from_chunks)
            .take_while(|(a, b)| a == *b)
            .count();
        if common > longest {
            longest = common;
            closest = Some(path);
            tied = false;
        } else if common == longest && common > 0 {
            tied = true;
        }
    }

    if tied {
        None
    } else {
        closest
    }
}
