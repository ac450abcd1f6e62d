//! Root directory scanning.
//!
//! Produces the desired state for one maintenance tick: every eligible node
//! folder across all roots, keyed by logical name. The first folder to claim
//! a name wins; roots are visited in order and folders within a root in
//! ordinal filename order, because directory listing order is not stable.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::filter::HostingFilters;
use crate::name::{LogicalName, codec};

/// Folder name the desktop shells give freshly created directories.
const NEW_FOLDER: &str = "New folder";

/// Folders named like this are never hosted.
pub fn is_reserved_folder_name(filename: &str) -> bool {
    filename.starts_with('.') || filename.starts_with('_') || filename.eq_ignore_ascii_case(NEW_FOLDER)
}

/// Scan all roots in order and collect eligible node folders.
pub fn scan_roots(roots: &[PathBuf], filters: &HostingFilters) -> IndexMap<LogicalName, PathBuf> {
    let mut current = IndexMap::new();
    for root in roots {
        scan_root(&mut current, root, filters);
    }
    current
}

/// Add the eligible folders of one root to `current`, keeping earlier claims.
pub fn scan_root(current: &mut IndexMap<LogicalName, PathBuf>, root: &Path, filters: &HostingFilters) {
    let mut folders = match list_directories(root) {
        Ok(folders) => folders,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            crate::debug_event!("scan", "root missing", "{}", root.display());
            return;
        }
        Err(e) => {
            tracing::warn!("[scan] cannot list {}: {e}", root.display());
            return;
        }
    };

    folders.sort_by(|a, b| a.0.cmp(&b.0));

    for (filename, path) in folders {
        let filename = filename.to_string_lossy();
        if is_reserved_folder_name(&filename) {
            continue;
        }

        let name = codec::decode(&filename);
        if name.is_empty() {
            crate::debug_event!("scan", "unnamed folder skipped", "{}", path.display());
            continue;
        }
        if !filters.should_include(&name) {
            continue;
        }
        if let Some(winner) = current.get(&name) {
            crate::debug_event!(
                "scan",
                "shadowed",
                "{} (name '{name}' already taken by {})",
                path.display(),
                winner.display()
            );
            continue;
        }

        current.insert(name, path);
    }
}

fn list_directories(root: &Path) -> io::Result<Vec<(OsString, PathBuf)>> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("[scan] unreadable entry in {}: {e}", root.display());
                continue;
            }
        };
        let path = entry.path();
        // Follows symlinks, so linked node folders are hosted too
        if path.is_dir() {
            folders.push((entry.file_name(), path));
        }
    }
    Ok(folders)
}
