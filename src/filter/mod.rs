//! Include/exclude hosting filters.
//!
//! Names are tested against compiled include patterns first (an empty
//! include list accepts everything), then against exclude patterns.
//! Exclusion always wins.

mod pattern;

pub use pattern::Pattern;

use crate::host::error::{HostError, HostResult};
use crate::name::LogicalName;

/// Compile raw glob strings, dropping blank entries.
pub fn compile<S: AsRef<str>>(raw: &[S]) -> Vec<Pattern> {
    raw.iter()
        .filter_map(|p| Pattern::compile(p.as_ref()))
        .collect()
}

/// Decide whether `name` is eligible given compiled includes and excludes.
pub fn matches(name: &LogicalName, includes: &[Pattern], excludes: &[Pattern]) -> bool {
    let mut include = includes.is_empty() || includes.iter().any(|p| p.is_match(name));

    if excludes.iter().any(|p| p.is_match(name)) {
        include = false;
    }

    include
}

/// Raw and compiled hosting filters, swapped as a unit when changed.
#[derive(Debug, Clone, Default)]
pub struct HostingFilters {
    raw_includes: Vec<String>,
    raw_excludes: Vec<String>,
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

impl HostingFilters {
    pub fn new(includes: Vec<String>, excludes: Vec<String>) -> Self {
        Self {
            includes: compile(&includes),
            excludes: compile(&excludes),
            raw_includes: includes,
            raw_excludes: excludes,
        }
    }

    /// The unprocessed include strings, as supplied.
    pub fn raw_includes(&self) -> &[String] {
        &self.raw_includes
    }

    /// The unprocessed exclude strings, as supplied.
    pub fn raw_excludes(&self) -> &[String] {
        &self.raw_excludes
    }

    pub fn should_include(&self, name: &LogicalName) -> bool {
        matches(name, &self.includes, &self.excludes)
    }

    /// Like [`should_include`](Self::should_include) but reports the active rule on rejection.
    pub fn check(&self, name: &LogicalName) -> HostResult<()> {
        if self.should_include(name) {
            return Ok(());
        }
        Err(HostError::FilterRejection {
            name: name.to_string(),
            includes: json_list(&self.raw_includes),
            excludes: json_list(&self.raw_excludes),
        })
    }

    /// Human-readable rule, e.g. `Include everything, exclude ["*Test"]`.
    pub fn describe(&self) -> String {
        let includes = if self.raw_includes.is_empty() {
            "everything".to_string()
        } else {
            json_list(&self.raw_includes)
        };
        let excludes = if self.raw_excludes.is_empty() {
            "nothing".to_string()
        } else {
            json_list(&self.raw_excludes)
        };
        format!("Include {includes}, exclude {excludes}")
    }
}

fn json_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| format!("{items:?}"))
}
