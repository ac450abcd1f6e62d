//! Folder copying for recipe-based node creation.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use super::error::{HostError, HostResult};

/// Recursively copy `src` into `dst`, creating `dst`.
pub fn copy_dir(src: &Path, dst: &Path) -> HostResult<()> {
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            HostError::fs("read recipe", path, e.into())
        })?;

        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| HostError::fs("create folder", &target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| HostError::fs("copy file", &target, e))?;
        }
    }
    Ok(())
}

/// Copy `src` to `dst` through a `_`-prefixed staging folder next to `dst`.
///
/// Staging folders are invisible to scans, so a tick never sees a partial copy.
pub fn copy_dir_staged(src: &Path, dst: &Path) -> HostResult<()> {
    let (Some(parent), Some(file_name)) = (dst.parent(), dst.file_name()) else {
        return Err(HostError::InvalidName {
            reason: format!("{} has no parent folder", dst.display()),
        });
    };

    let staging = parent.join(format!(
        "_{}.{}.staging",
        file_name.to_string_lossy(),
        std::process::id()
    ));
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(|e| HostError::fs("clear staging folder", &staging, e))?;
    }

    let result = copy_dir(src, &staging).and_then(|()| {
        fs::rename(&staging, dst).map_err(|e| HostError::fs("move staged node folder", dst, e))
    });

    if result.is_err() && staging.exists() {
        if let Err(e) = fs::remove_dir_all(&staging) {
            tracing::warn!("[host] could not remove {}: {e}", staging.display());
        }
    }
    result
}
