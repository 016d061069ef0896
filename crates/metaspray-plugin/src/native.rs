//! Native (in-process) plugin support.
//!
//! Native plugins run as Rust code inside the host. The host looks them up
//! by the name used in the ledger's `plugin` directive.

use crate::spray::MetadataSprayPlugin;
use crate::types::{PluginInput, PluginOutput};

/// Module path accepted in front of plugin names in `plugin` directives.
const LEGACY_MODULE: &str = "beancount_plugins_metadata_spray.plugins.";

/// Trait for native plugins.
pub trait NativePlugin: Send + Sync {
    /// Plugin name.
    fn name(&self) -> &str;

    /// Process entries and return them, possibly modified, with any errors.
    fn process(&self, input: PluginInput) -> PluginOutput;
}

/// Registry of built-in native plugins.
pub struct NativePluginRegistry {
    plugins: Vec<Box<dyn NativePlugin>>,
}

impl NativePluginRegistry {
    /// Create a new registry with all built-in plugins.
    pub fn new() -> Self {
        Self {
            plugins: vec![Box::new(MetadataSprayPlugin)],
        }
    }

    /// Find a plugin by name.
    pub fn find(&self, name: &str) -> Option<&dyn NativePlugin> {
        let name = name.strip_prefix(LEGACY_MODULE).unwrap_or(name);

        self.plugins
            .iter()
            .find(|p| p.name() == name)
            .map(std::convert::AsRef::as_ref)
    }

    /// Check if a name refers to a built-in plugin.
    pub fn is_builtin(name: &str) -> bool {
        let name = name.strip_prefix(LEGACY_MODULE).unwrap_or(name);

        matches!(name, "metadata_spray")
    }

    /// Names of all registered plugins.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.name())
    }
}

impl Default for NativePluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
