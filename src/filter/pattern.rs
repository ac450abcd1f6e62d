//! Wildcard patterns over reduced logical names.
//!
//! Only `*` (any run, possibly empty) and `?` (exactly one character) are
//! wildcards. The literal runs between them are reduced the same way names
//! are, so `"Kitchen *"` matches `"kitchen-2"` as well as `"KITCHEN 2"`. The
//! rewritten pattern is matched with [`glob::Pattern`].

use glob::MatchOptions;

use crate::name::{LogicalName, reduce};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A compiled wildcard pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    glob: glob::Pattern,
}

impl Pattern {
    /// Compile a raw pattern. Returns `None` for blank input.
    pub fn compile(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }

        let source = to_glob(raw);
        match glob::Pattern::new(&source) {
            Ok(glob) => Some(Self {
                raw: raw.to_string(),
                glob,
            }),
            Err(e) => {
                tracing::warn!("[filter] ignoring pattern '{raw}': {e}");
                None
            }
        }
    }

    /// The pattern as the user wrote it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The glob actually matched against reduced names.
    pub fn as_glob(&self) -> &str {
        self.glob.as_str()
    }

    /// Test a logical name against this pattern.
    pub fn is_match(&self, name: &LogicalName) -> bool {
        self.glob.matches_with(name.reduced(), MATCH_OPTIONS)
    }
}

/// Rewrite a user pattern as a glob over reduced text.
///
/// Consecutive stars collapse into one; `glob` reads `**` as a recursive
/// path wildcard.
fn to_glob(raw: &str) -> String {
    let mut glob = String::with_capacity(raw.len());
    let mut literal = String::new();

    for c in raw.chars() {
        match c {
            '*' | '?' => {
                push_literal(&mut glob, &mut literal);
                if c == '*' && glob.ends_with('*') {
                    continue;
                }
                glob.push(c);
            }
            _ => literal.push(c),
        }
    }
    push_literal(&mut glob, &mut literal);
    glob
}

fn push_literal(glob: &mut String, literal: &mut String) {
    if literal.is_empty() {
        return;
    }
    glob.push_str(&glob::Pattern::escape(&reduce(literal)));
    literal.clear();
}
