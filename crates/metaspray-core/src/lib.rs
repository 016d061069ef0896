//! Core types for metaspray
//!
//! This crate provides the ledger entry model the metadata spray engine
//! operates on:
//!
//! - [`Directive`] - The entry kinds (Open, Commodity, Close, Note, Event)
//! - [`EntryKind`] - The fieldless discriminant of a directive
//! - [`MetaValue`] - A scalar metadata value
//! - [`Metadata`] - Insertion-ordered metadata attached to a directive
//! - [`Located`] - A value paired with its [`SourceLocation`]
//!
//! # Example
//!
//! ```
//! use metaspray_core::{Directive, Entry, MetaValue, NaiveDate, Open, SourceLocation};
//!
//! let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let mut entry = Entry::new(
//!     Directive::Open(Open::new(date, "Assets:Bank:Checking")),
//!     SourceLocation::new("ledger.beancount", 12),
//! );
//!
//! entry.value.meta_mut().insert("tag", MetaValue::String("cash".into()));
//!
//! assert_eq!(entry.value.type_name(), "open");
//! assert!(entry.value.meta().contains_key("tag"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod directive;
pub mod location;

pub use directive::{
    Close, Commodity, Directive, EntryKind, Event, MetaValue, Metadata, Note, Open,
};
pub use location::{Entry, Located, SourceLocation};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
