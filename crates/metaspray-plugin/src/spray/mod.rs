//! The `metadata_spray` plugin.
//!
//! Injects metadata into Open and Commodity entries whose account or
//! currency matches a configured pattern. Each rule names the entry kind it
//! targets, a pattern matched against the start of the entry's account or
//! currency, the metadata to add, and what to do when a key already exists:
//!
//! - `return_error`: keep the existing value and report the conflict
//! - `dont_overwrite`: keep the existing value silently
//! - `overwrite`: replace the existing value
//!
//! Rules are validated and compiled once. Invalid rules are reported and
//! dropped; the remaining rules are applied to every entry in input order,
//! and within an entry in the order they were declared.

pub mod apply;
pub mod config;
pub mod rules;

pub use apply::{apply_metadata, spray_entry, SprayTarget};
pub use config::{meta_value_from_json, ConfigError, RawSpray, SprayConfig, ValueError};
pub use rules::{CompiledSpray, ReplaceType, RuleError, SprayRules, SprayType};

use metaspray_core::Entry;

use crate::native::NativePlugin;
use crate::types::{PluginError, PluginInput, PluginOutput};

/// File tag used in the location of every diagnostic this plugin reports.
pub const SOURCE_TAG: &str = "<metadata_spray>";

/// Apply `rules` to `entries` in place.
///
/// Entries whose kind has no rules are skipped. Errors are returned in entry
/// order, then rule order, then metadata key order.
pub fn spray_entries(entries: &mut [Entry], rules: &SprayRules) -> Vec<PluginError> {
    let mut errors = Vec::new();

    for (index, entry) in entries.iter_mut().enumerate() {
        let Some(spray_type) = SprayType::for_kind(entry.value.kind()) else {
            continue;
        };
        for spray in rules.for_type(spray_type) {
            errors.extend(spray_entry(entry, index, spray));
        }
    }

    errors
}

/// Plugin that sprays metadata onto matching Open and Commodity entries.
///
/// The configuration is a JSON object with a `sprays` list, see [`config`].
pub struct MetadataSprayPlugin;

impl NativePlugin for MetadataSprayPlugin {
    fn name(&self) -> &'static str {
        "metadata_spray"
    }

    fn process(&self, input: PluginInput) -> PluginOutput {
        let mut directives = input.directives;

        let (rules, mut errors) = match input.config.as_deref() {
            Some(source) => SprayRules::from_config_str(source),
            None => {
                let err = ConfigError::Missing;
                tracing::warn!("{err}");
                (SprayRules::default(), vec![rules::config_error(&err)])
            }
        };

        if !rules.is_empty() {
            errors.extend(spray_entries(&mut directives, &rules));
        }

        tracing::debug!(
            entries = directives.len(),
            errors = errors.len(),
            "metadata spray finished"
        );

        PluginOutput { directives, errors }
    }
}
