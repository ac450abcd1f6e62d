//! Logical names for nodes, actions and events.
//!
//! A [`LogicalName`] keeps the spelling it was created with but compares,
//! hashes and orders by its reduced form: Unicode alphanumerics only,
//! lower-cased. `"Office #1"`, `"office1"` and `"OFFICE 1"` are the same name.

pub mod codec;

pub use codec::{decode, encode, is_safe_char};

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Normalized identifier with its original spelling preserved.
#[derive(Debug, Clone)]
pub struct LogicalName {
    original: Box<str>,
    reduced: Box<str>,
}

impl LogicalName {
    /// Create a name from any human-readable spelling.
    pub fn new(original: impl Into<String>) -> Self {
        let original: String = original.into();
        let reduced = reduce(&original);
        Self {
            original: original.into_boxed_str(),
            reduced: reduced.into_boxed_str(),
        }
    }

    /// The spelling this name was created with.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The normalized form used for identity.
    pub fn reduced(&self) -> &str {
        &self.reduced
    }

    /// True when nothing survives reduction (e.g. `"###"`).
    pub fn is_empty(&self) -> bool {
        self.reduced.is_empty()
    }
}

/// Reduce a spelling to its identity form.
pub fn reduce(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl PartialEq for LogicalName {
    fn eq(&self, other: &Self) -> bool {
        self.reduced == other.reduced
    }
}

impl Eq for LogicalName {}

impl Hash for LogicalName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.reduced.hash(state);
    }
}

impl PartialOrd for LogicalName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogicalName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.reduced.cmp(&other.reduced)
    }
}

impl fmt::Display for LogicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl From<&str> for LogicalName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for LogicalName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl Serialize for LogicalName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

impl<'de> Deserialize<'de> for LogicalName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}
