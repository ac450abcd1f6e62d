//! Recipe templates that new nodes can be copied from.

use std::fs;
use std::path::{Component, Path, PathBuf};

use super::scan::is_reserved_folder_name;

/// A directory of template node folders.
#[derive(Debug, Clone)]
pub struct Recipes {
    root: PathBuf,
}

impl Recipes {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a recipe name (a relative path below the recipes root) to its folder.
    ///
    /// Absolute paths and `..` components never resolve.
    pub fn resolve(&self, recipe: &str) -> Option<PathBuf> {
        if recipe.trim().is_empty() {
            return None;
        }
        let relative = Path::new(recipe);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }

        let folder = self.root.join(relative);
        folder.is_dir().then_some(folder)
    }

    /// Names of the recipes directly below the root, sorted.
    pub fn list(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !is_reserved_folder_name(name))
            .collect();
        names.sort();
        names
    }
}
