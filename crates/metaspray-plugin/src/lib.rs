//! Beancount metadata spray plugin.
//!
//! This crate provides a native plugin that adds metadata to ledger entries
//! by pattern. A configuration lists "spray" rules; each rule targets Open
//! or Commodity entries, matches the account or currency against a regular
//! expression anchored at the start, and writes its metadata into matching
//! entries under a conflict policy.
//!
//! The engine is a pure in-memory transform. It never aborts: invalid rules
//! and metadata conflicts become [`PluginError`] values returned alongside
//! the entries.
//!
//! # Example
//!
//! ```
//! use metaspray_core::{Directive, Entry, MetaValue, NaiveDate, Open, SourceLocation};
//! use metaspray_plugin::{NativePlugin, NativePluginRegistry, PluginInput};
//!
//! let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let input = PluginInput {
//!     directives: vec![Entry::new(
//!         Directive::Open(Open::new(date, "Assets:Bank:Checking")),
//!         SourceLocation::new("ledger.beancount", 1),
//!     )],
//!     config: Some(
//!         r#"{"sprays": [{"spray_type": "open", "replace_type": "overwrite",
//!                         "pattern": "Assets:Bank", "metadata_dict": {"tag": "cash"}}]}"#
//!             .to_string(),
//!     ),
//! };
//!
//! let registry = NativePluginRegistry::new();
//! let output = registry.find("metadata_spray").unwrap().process(input);
//!
//! assert!(output.errors.is_empty());
//! assert_eq!(
//!     output.directives[0].value.meta().get("tag"),
//!     Some(&MetaValue::String("cash".to_string()))
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod native;
pub mod spray;
pub mod types;

pub use native::{NativePlugin, NativePluginRegistry};
pub use spray::{spray_entries, MetadataSprayPlugin, SprayRules};
pub use types::{PluginError, PluginInput, PluginOutput};
