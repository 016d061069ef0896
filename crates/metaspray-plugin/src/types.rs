//! Plugin interface types.
//!
//! These types are passed across the plugin boundary: the host hands a
//! [`PluginInput`] to a plugin and receives a [`PluginOutput`] back.

use metaspray_core::{Entry, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Input passed to a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInput {
    /// All entries, in ledger order.
    pub directives: Vec<Entry>,
    /// Plugin-specific configuration string (from the `plugin` directive).
    pub config: Option<String>,
}

/// Output returned from a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginOutput {
    /// The entries, possibly modified.
    pub directives: Vec<Entry>,
    /// Diagnostics produced while processing.
    pub errors: Vec<PluginError>,
}

/// A diagnostic produced by a plugin.
///
/// Plugin errors never abort processing; they are collected and returned
/// alongside the entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginError {
    /// Human-readable message.
    pub message: String,
    /// Where the problem was found.
    pub location: SourceLocation,
    /// Index of the originating entry in the input, if any.
    pub entry: Option<usize>,
}

impl PluginError {
    /// Create an error at the given location, not tied to an entry.
    pub fn error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
            entry: None,
        }
    }

    /// Attach the index of the originating entry.
    #[must_use]
    pub const fn with_entry(mut self, index: usize) -> Self {
        self.entry = Some(index);
        self
    }
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: error: {}", self.location, self.message)
    }
}
