//! Pattern matching and metadata application for a single entry.

use metaspray_core::{Directive, Entry, EntryKind, MetaValue, Metadata, SourceLocation};

use super::rules::{CompiledSpray, ReplaceType, SprayType};
use super::SOURCE_TAG;
use crate::types::PluginError;

/// The entry a spray is being applied to, as named in conflict messages.
#[derive(Debug, Clone, Copy)]
pub struct SprayTarget<'a> {
    /// Kind of the entry.
    pub kind: EntryKind,
    /// The matched field: account for Open, currency for Commodity.
    pub name: &'a str,
    /// Line the entry was loaded from.
    pub lineno: u32,
    /// Position of the entry in the input.
    pub index: usize,
}

impl SprayTarget<'_> {
    fn conflict(&self, key: &str) -> PluginError {
        PluginError::error(
            format!(
                "existing metadata '{key}' found in {} '{}', skipping",
                self.kind, self.name
            ),
            SourceLocation::new(SOURCE_TAG, self.lineno),
        )
        .with_entry(self.index)
    }
}

/// Apply one spray to one entry.
///
/// Entries of a kind the spray does not target, and entries whose field does
/// not match the pattern, are left untouched.
pub fn spray_entry(entry: &mut Entry, index: usize, spray: &CompiledSpray) -> Vec<PluginError> {
    let lineno = entry.location.lineno;
    let (kind, name, meta) = match &mut entry.value {
        Directive::Open(open) if spray.spray_type == SprayType::Open => {
            (EntryKind::Open, open.account.as_str(), &mut open.meta)
        }
        Directive::Commodity(comm) if spray.spray_type == SprayType::Commodity => {
            (EntryKind::Commodity, comm.currency.as_str(), &mut comm.meta)
        }
        _ => return Vec::new(),
    };

    if !spray.is_match(name) {
        return Vec::new();
    }
    tracing::trace!(
        rule = spray.index,
        entry = index,
        "{kind} '{name}' matches '{}'",
        spray.pattern
    );

    let target = SprayTarget {
        kind,
        name,
        lineno,
        index,
    };
    apply_metadata(&target, meta, spray.replace_type, &spray.metadata)
}

/// Write `metadata` into `meta` under the given conflict policy.
///
/// Keys are visited in order. Absent keys are always written; present keys
/// are reported, skipped or replaced according to `replace_type`.
pub fn apply_metadata(
    target: &SprayTarget<'_>,
    meta: &mut Metadata,
    replace_type: ReplaceType,
    metadata: &[(String, MetaValue)],
) -> Vec<PluginError> {
    let mut errors = Vec::new();

    for (key, value) in metadata {
        if meta.contains_key(key) {
            match replace_type {
                ReplaceType::ReturnError => {
                    errors.push(target.conflict(key));
                    continue;
                }
                ReplaceType::DontOverwrite => {
                    tracing::trace!(entry = target.index, "keeping existing '{key}'");
                    continue;
                }
                ReplaceType::Overwrite => {}
            }
        }

        tracing::trace!(entry = target.index, "setting '{key}' to {value}");
        meta.insert(key.clone(), value.clone());
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spray::config::RawSpray;
    use metaspray_core::{Close, Commodity, NaiveDate, Open};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn spray(
        spray_type: &str,
        replace_type: &str,
        pattern: &str,
        dict: serde_json::Value,
    ) -> CompiledSpray {
        let raw = RawSpray {
            spray_type: Some(spray_type.to_string()),
            replace_type: Some(replace_type.to_string()),
            pattern: Some(pattern.to_string()),
            metadata_dict: dict.as_object().cloned().unwrap(),
        };
        CompiledSpray::compile(raw, 0).unwrap()
    }

    fn open_entry(account: &str, meta: Metadata) -> Entry {
        Entry::new(
            Directive::Open(Open::new(date(), account).with_meta(meta)),
            SourceLocation::new("main.beancount", 10),
        )
    }

    fn tag(value: &str) -> MetaValue {
        MetaValue::String(value.to_string())
    }

    #[test]
    fn test_match_sets_absent_keys() {
        let mut entry = open_entry("Assets:Bank:Checking", Metadata::new());
        let rule = spray(
            "open",
            "return_error",
            "Assets:Bank",
            json!({"tag": "cash", "rank": 2}),
        );

        let errors = spray_entry(&mut entry, 0, &rule);

        assert!(errors.is_empty());
        assert_eq!(entry.value.meta().get("tag"), Some(&tag("cash")));
        assert_eq!(
            entry.value.meta().get("rank"),
            Some(&MetaValue::Number(dec!(2)))
        );
    }

    #[test]
    fn test_no_match_leaves_entry() {
        let mut entry = open_entry("Liabilities:Card", Metadata::new());
        let rule = spray("open", "overwrite", "Assets", json!({"tag": "cash"}));

        assert!(spray_entry(&mut entry, 0, &rule).is_empty());
        assert!(entry.value.meta().is_empty());
    }

    #[test]
    fn test_kind_mismatch_is_ignored() {
        let mut entry = Entry::new(
            Directive::Close(Close::new(date(), "Assets:Bank")),
            SourceLocation::new("main.beancount", 3),
        );
        let rule = spray("open", "overwrite", "Assets", json!({"tag": "cash"}));

        assert!(spray_entry(&mut entry, 0, &rule).is_empty());
        assert!(entry.value.meta().is_empty());
    }

    #[test]
    fn test_return_error_reports_conflict() {
        let meta: Metadata = [("tag", tag("manual"))].into_iter().collect();
        let mut entry = open_entry("Assets:Bank:Checking", meta);
        let rule = spray(
            "open",
            "return_error",
            "Assets:Bank",
            json!({"tag": "cash", "new": true}),
        );

        let errors = spray_entry(&mut entry, 5, &rule);

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "existing metadata 'tag' found in Open 'Assets:Bank:Checking', skipping"
        );
        assert_eq!(errors[0].location, SourceLocation::new(SOURCE_TAG, 10));
        assert_eq!(errors[0].entry, Some(5));
        assert_eq!(entry.value.meta().get("tag"), Some(&tag("manual")));
        assert_eq!(entry.value.meta().get("new"), Some(&MetaValue::Bool(true)));
    }

    #[test]
    fn test_dont_overwrite_is_silent() {
        let meta: Metadata = [("tag", tag("manual"))].into_iter().collect();
        let mut entry = open_entry("Assets:Bank", meta);
        let rule = spray("open", "dont_overwrite", "Assets", json!({"tag": "cash"}));

        assert!(spray_entry(&mut entry, 0, &rule).is_empty());
        assert_eq!(entry.value.meta().get("tag"), Some(&tag("manual")));
    }

    #[test]
    fn test_overwrite_replaces_in_place() {
        let meta: Metadata = [("tag", tag("manual")), ("other", MetaValue::None)]
            .into_iter()
            .collect();
        let mut entry = open_entry("Assets:Bank", meta);
        let rule = spray("open", "overwrite", "Assets", json!({"tag": "cash"}));

        assert!(spray_entry(&mut entry, 0, &rule).is_empty());
        assert_eq!(entry.value.meta().get("tag"), Some(&tag("cash")));
        let keys: Vec<_> = entry.value.meta().keys().collect();
        assert_eq!(keys, vec!["tag", "other"]);
    }

    #[test]
    fn test_commodity_conflict_message() {
        let meta: Metadata = [("name", tag("US Dollar"))].into_iter().collect();
        let mut entry = Entry::new(
            Directive::Commodity(Commodity::new(date(), "USD").with_meta(meta)),
            SourceLocation::new("main.beancount", 22),
        );
        let rule = spray("commodity", "return_error", "USD", json!({"name": "Dollar"}));

        let errors = spray_entry(&mut entry, 1, &rule);

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "existing metadata 'name' found in Commodity 'USD', skipping"
        );
        assert_eq!(errors[0].location.lineno, 22);
    }

    #[test]
    fn test_apply_metadata_reports_each_key_in_order() {
        let mut meta: Metadata = [("b", MetaValue::None), ("a", MetaValue::None)]
            .into_iter()
            .collect();
        let target = SprayTarget {
            kind: EntryKind::Open,
            name: "Assets:Cash",
            lineno: 4,
            index: 0,
        };
        let metadata = vec![
            ("a".to_string(), tag("x")),
            ("c".to_string(), tag("y")),
            ("b".to_string(), tag("z")),
        ];

        let errors = apply_metadata(&target, &mut meta, ReplaceType::ReturnError, &metadata);

        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "existing metadata 'a' found in Open 'Assets:Cash', skipping",
                "existing metadata 'b' found in Open 'Assets:Cash', skipping",
            ]
        );
        assert_eq!(meta.get("c"), Some(&tag("y")));
        assert_eq!(meta.len(), 3);
    }
}
