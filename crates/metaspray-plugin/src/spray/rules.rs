//! Rule validation, pattern compilation and indexing by entry kind.

use std::fmt;

use metaspray_core::{EntryKind, MetaValue, SourceLocation};
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use super::config::{meta_value_from_json, RawSpray, SprayConfig, ValueError};
use super::SOURCE_TAG;
use crate::types::PluginError;

/// Why a configured rule was dropped.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule is not an object or a field has the wrong type.
    #[error("malformed spray rule: {0}")]
    Malformed(#[source] serde_json::Error),
    /// `spray_type` or `replace_type` is absent.
    #[error("missing spray or replace type, skipping this spray operation")]
    MissingType,
    /// `spray_type` names no supported entry kind.
    #[error("invalid spray type: {0}, skipping this spray operation")]
    InvalidSprayType(String),
    /// `replace_type` names no supported policy.
    #[error("invalid replace type: {0}, skipping this spray operation")]
    InvalidReplaceType(String),
    /// `pattern` is absent.
    #[error("missing pattern, skipping this spray operation")]
    MissingPattern,
    /// `pattern` is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as configured.
        pattern: String,
        /// The compilation error.
        source: regex::Error,
    },
    /// A `metadata_dict` value has no metadata equivalent.
    #[error("invalid metadata value for '{key}': {source}")]
    InvalidMetadata {
        /// The offending key.
        key: String,
        /// The conversion error.
        source: ValueError,
    },
}

/// The entry kind a spray targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SprayType {
    /// Open directives, matched on the account name.
    Open,
    /// Commodity directives, matched on the currency.
    Commodity,
}

impl SprayType {
    /// Look up a spray type by its configured name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "open" => Some(Self::Open),
            "commodity" => Some(Self::Commodity),
            _ => None,
        }
    }

    /// The spray type handling entries of `kind`, if any.
    #[must_use]
    pub const fn for_kind(kind: EntryKind) -> Option<Self> {
        match kind {
            EntryKind::Open => Some(Self::Open),
            EntryKind::Commodity => Some(Self::Commodity),
            EntryKind::Close | EntryKind::Note | EntryKind::Event => None,
        }
    }

    /// Configured name of this spray type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Commodity => "commodity",
        }
    }
}

impl fmt::Display for SprayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What to do when a metadata key already exists on the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplaceType {
    /// Keep the existing value and report the conflict.
    ReturnError,
    /// Keep the existing value silently.
    DontOverwrite,
    /// Replace the existing value.
    Overwrite,
}

impl ReplaceType {
    /// Look up a replace type by its configured name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "return_error" => Some(Self::ReturnError),
            "dont_overwrite" => Some(Self::DontOverwrite),
            "overwrite" => Some(Self::Overwrite),
            _ => None,
        }
    }

    /// Configured name of this replace type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ReturnError => "return_error",
            Self::DontOverwrite => "dont_overwrite",
            Self::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for ReplaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated rule with its pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledSpray {
    /// Position of the rule in the configured list.
    pub index: usize,
    /// Targeted entry kind.
    pub spray_type: SprayType,
    /// Conflict policy.
    pub replace_type: ReplaceType,
    /// The pattern as configured.
    pub pattern: String,
    /// Metadata to inject, in configured order.
    pub metadata: Vec<(String, MetaValue)>,
    regex: Regex,
}

impl CompiledSpray {
    /// Validate a configured rule and compile its pattern.
    pub fn compile(raw: RawSpray, index: usize) -> Result<Self, RuleError> {
        let (Some(spray_type), Some(replace_type)) = (raw.spray_type, raw.replace_type) else {
            return Err(RuleError::MissingType);
        };
        let spray_type =
            SprayType::from_name(&spray_type).ok_or(RuleError::InvalidSprayType(spray_type))?;
        let replace_type = ReplaceType::from_name(&replace_type)
            .ok_or(RuleError::InvalidReplaceType(replace_type))?;
        let pattern = raw.pattern.ok_or(RuleError::MissingPattern)?;

        let regex = Regex::new(&pattern).map_err(|source| RuleError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;

        let metadata = raw
            .metadata_dict
            .iter()
            .map(|(key, value)| {
                meta_value_from_json(value)
                    .map(|v| (key.clone(), v))
                    .map_err(|source| RuleError::InvalidMetadata {
                        key: key.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            index,
            spray_type,
            replace_type,
            pattern,
            metadata,
            regex,
        })
    }

    /// Check if `field` starts with a match of the pattern.
    ///
    /// Leftmost-first search reports a match at offset 0 whenever one exists.
    #[must_use]
    pub fn is_match(&self, field: &str) -> bool {
        self.regex.find(field).is_some_and(|m| m.start() == 0)
    }
}

/// Active rules grouped by spray type, each group in declaration order.
#[derive(Debug, Clone, Default)]
pub struct SprayRules {
    open: Vec<CompiledSpray>,
    commodity: Vec<CompiledSpray>,
}

impl SprayRules {
    /// Validate and index configured rules.
    ///
    /// Invalid rules are dropped, each producing exactly one error.
    pub fn from_config(config: SprayConfig) -> (Self, Vec<PluginError>) {
        let mut rules = Self::default();
        let mut errors = Vec::new();

        for (index, value) in config.sprays.into_iter().enumerate() {
            match compile_rule(value, index) {
                Ok(spray) => rules.push(spray),
                Err(err) => {
                    tracing::warn!(rule = index, "dropping spray rule: {err}");
                    errors.push(config_error(&err));
                }
            }
        }

        tracing::debug!(
            open = rules.open.len(),
            commodity = rules.commodity.len(),
            dropped = errors.len(),
            "metadata spray rules loaded"
        );

        (rules, errors)
    }

    /// Parse a configuration string, then validate and index its rules.
    ///
    /// A configuration that cannot be parsed yields no rules and one error.
    pub fn from_config_str(source: &str) -> (Self, Vec<PluginError>) {
        match SprayConfig::parse(source) {
            Ok(config) => Self::from_config(config),
            Err(err) => {
                tracing::warn!("unusable metadata spray configuration: {err}");
                (Self::default(), vec![config_error(&err)])
            }
        }
    }

    fn push(&mut self, spray: CompiledSpray) {
        match spray.spray_type {
            SprayType::Open => self.open.push(spray),
            SprayType::Commodity => self.commodity.push(spray),
        }
    }

    /// Rules of the given spray type, in declaration order.
    #[must_use]
    pub fn for_type(&self, spray_type: SprayType) -> &[CompiledSpray] {
        match spray_type {
            SprayType::Open => &self.open,
            SprayType::Commodity => &self.commodity,
        }
    }

    /// Total number of active rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.open.len() + self.commodity.len()
    }

    /// Check if no rule is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn compile_rule(value: Value, index: usize) -> Result<CompiledSpray, RuleError> {
    let raw = RawSpray::from_value(value).map_err(RuleError::Malformed)?;
    CompiledSpray::compile(raw, index)
}

/// A configuration-level error: synthetic location, no entry.
pub(crate) fn config_error(err: &dyn std::error::Error) -> PluginError {
    PluginError::error(err.to_string(), SourceLocation::synthetic(SOURCE_TAG))
}
