//! Source location tracking.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Directive;

/// A position in a ledger source, as a file tag and a 1-based line number.
///
/// Line 0 is reserved for synthetic locations that do not correspond to
/// any line of input (for example, diagnostics about configuration).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// File name or a synthetic tag such as `<metadata_spray>`.
    pub filename: String,
    /// Line number (0 for synthetic locations).
    pub lineno: u32,
}

impl SourceLocation {
    /// Create a new source location.
    #[must_use]
    pub fn new(filename: impl Into<String>, lineno: u32) -> Self {
        Self {
            filename: filename.into(),
            lineno,
        }
    }

    /// Create a synthetic location (line 0) under the given tag.
    #[must_use]
    pub fn synthetic(tag: impl Into<String>) -> Self {
        Self::new(tag, 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.lineno)
    }
}

/// A value with an associated source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Located<T> {
    /// The value.
    pub value: T,
    /// Where the value came from.
    pub location: SourceLocation,
}

impl<T> Located<T> {
    /// Create a new located value.
    #[must_use]
    pub const fn new(value: T, location: SourceLocation) -> Self {
        Self { value, location }
    }
}

impl<T: fmt::Display> fmt::Display for Located<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A ledger entry: a directive together with the line it was loaded from.
pub type Entry = Located<Directive>;
