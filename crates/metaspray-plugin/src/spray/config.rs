//! Spray configuration parsing.
//!
//! The plugin configuration is a JSON document:
//!
//! ```json
//! {"sprays": [{"spray_type": "open", "replace_type": "overwrite",
//!              "pattern": "Assets:Bank", "metadata_dict": {"tag": "cash"}}]}
//! ```
//!
//! Plain JSON scalars map to strings, numbers (exact decimals) and booleans.
//! The other metadata kinds are written as single-key objects, for example
//! `{"date": "2024-01-01"}` or `{"account": "Assets:Cash"}`.
//!
//! Numbers must fit a [`Decimal`]: at most 28 digits after the point and a
//! magnitude below 2^96. Numbers are never rounded; a value outside these
//! limits is rejected along with its rule.

use chrono::NaiveDate;
use metaspray_core::MetaValue;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that make the whole configuration unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The plugin was loaded without a configuration string.
    #[error("missing configuration, expected a JSON object with a 'sprays' list")]
    Missing,
    /// The configuration is not valid JSON or has the wrong shape.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// The configuration is valid JSON but not an object.
    #[error("invalid configuration: expected a JSON object with a 'sprays' list")]
    NotAnObject,
    /// The configuration has no `sprays` key.
    #[error("configuration has no 'sprays' list")]
    MissingSprays,
}

/// Errors converting a configured value into a metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Arrays and untagged objects have no metadata equivalent.
    #[error("unsupported value type: {0}")]
    Unsupported(&'static str),
    /// A tagged object used an unknown tag.
    #[error("unknown value tag '{0}'")]
    UnknownTag(String),
    /// A tagged object held something other than a string.
    #[error("'{0}' value must be a string")]
    NotAString(String),
    /// A date that is not `YYYY-MM-DD`.
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    /// A number that does not fit a decimal without rounding.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

/// The parsed configuration document.
///
/// Rules are kept as raw JSON values so that one malformed rule does not
/// prevent the others from loading.
#[derive(Debug, Clone, PartialEq)]
pub struct SprayConfig {
    /// The configured rules, in declaration order.
    pub sprays: Vec<Value>,
}

#[derive(Deserialize)]
struct Document {
    sprays: Option<Vec<Value>>,
}

impl SprayConfig {
    /// Parse a configuration string.
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let document: Value = serde_json::from_str(source)?;
        if !document.is_object() {
            return Err(ConfigError::NotAnObject);
        }
        let document: Document = serde_json::from_value(document)?;
        let sprays = document.sprays.ok_or(ConfigError::MissingSprays)?;
        Ok(Self { sprays })
    }
}

/// One rule as written in the configuration, before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSpray {
    /// Which entry kind the rule targets (`open` or `commodity`).
    pub spray_type: Option<String>,
    /// Conflict policy (`return_error`, `dont_overwrite` or `overwrite`).
    pub replace_type: Option<String>,
    /// Regular expression matched against the start of the entry's field.
    pub pattern: Option<String>,
    /// Metadata to inject, in the order written.
    #[serde(default)]
    pub metadata_dict: Map<String, Value>,
}

impl RawSpray {
    /// Interpret a configured rule.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if !value.is_object() {
            return Err(<serde_json::Error as serde::de::Error>::custom(
                "expected a spray rule object",
            ));
        }
        serde_json::from_value(value)
    }
}

/// Convert a configured JSON value into a metadata value.
pub fn meta_value_from_json(value: &Value) -> Result<MetaValue, ValueError> {
    match value {
        Value::Null => Ok(MetaValue::None),
        Value::Bool(b) => Ok(MetaValue::Bool(*b)),
        Value::Number(n) => parse_decimal(&n.to_string()).map(MetaValue::Number),
        Value::String(s) => Ok(MetaValue::String(s.clone())),
        Value::Array(_) => Err(ValueError::Unsupported("array")),
        Value::Object(map) => tagged_value(map),
    }
}

fn tagged_value(map: &Map<String, Value>) -> Result<MetaValue, ValueError> {
    let mut fields = map.iter();
    let (tag, inner) = match (fields.next(), fields.next()) {
        (Some(field), None) => field,
        _ => return Err(ValueError::Unsupported("object")),
    };
    let Value::String(text) = inner else {
        return Err(ValueError::NotAString(tag.clone()));
    };

    match tag.as_str() {
        "date" => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(MetaValue::Date)
            .map_err(|_| ValueError::InvalidDate(text.clone())),
        "number" => parse_decimal(text).map(MetaValue::Number),
        "account" => Ok(MetaValue::Account(text.clone())),
        "currency" => Ok(MetaValue::Currency(text.clone())),
        "tag" => Ok(MetaValue::Tag(text.clone())),
        "link" => Ok(MetaValue::Link(text.clone())),
        other => Err(ValueError::UnknownTag(other.to_string())),
    }
}

fn parse_decimal(text: &str) -> Result<Decimal, ValueError> {
    let text = text.trim();
    Decimal::from_str_exact(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| ValueError::InvalidNumber(text.to_string()))
}
