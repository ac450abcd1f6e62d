//! Difference between the scanned folders and the live registry.

use std::collections::HashSet;
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::name::LogicalName;

/// Folders to admit and names to retire for one tick.
///
/// Folders are compared by path: a renamed folder shows up as one removal
/// and one addition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderDiff {
    /// New folders in scan order.
    pub added: Vec<(LogicalName, PathBuf)>,
    /// Live names whose folder is gone (or no longer eligible).
    pub removed: Vec<LogicalName>,
}

impl FolderDiff {
    pub fn compute(
        current: &IndexMap<LogicalName, PathBuf>,
        live: &IndexMap<LogicalName, PathBuf>,
    ) -> Self {
        let live_paths: HashSet<&PathBuf> = live.values().collect();
        let current_paths: HashSet<&PathBuf> = current.values().collect();

        let added = current
            .iter()
            .filter(|(_, path)| !live_paths.contains(path))
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect();

        let removed = live
            .iter()
            .filter(|(_, path)| !current_paths.contains(path))
            .map(|(name, _)| name.clone())
            .collect();

        Self { added, removed }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
