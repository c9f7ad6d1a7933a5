//! Value codec: typed sample-data values and their stored string form.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

use super::field::DataType;

/// Format used for timestamps stored as string values.
///
/// Lexicographic order of this format equals chronological order, which the
/// date-range filters and the result ordering rely on.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A decoded sample-data value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SampleValue {
    /// A number.
    Numeric(f64),
    /// Free text.
    String(String),
    /// A flag.
    Boolean(bool),
    /// A timestamp; stored with the string tag.
    Date(NaiveDateTime),
}

impl SampleValue {
    /// The tag this value is written with.
    pub fn data_type(&self) -> DataType {
        match self {
            SampleValue::Numeric(_) => DataType::Numeric,
            SampleValue::Boolean(_) => DataType::Boolean,
            SampleValue::String(_) | SampleValue::Date(_) => DataType::String,
        }
    }

    /// The string written to the `VALUE` column.
    pub fn encode(&self) -> String {
        match self {
            SampleValue::Numeric(n) => n.to_string(),
            SampleValue::String(s) => s.clone(),
            SampleValue::Boolean(b) => b.to_string(),
            SampleValue::Date(d) => d.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Decodes a stored value according to its type tag.
    ///
    /// String-tagged values always decode to [`SampleValue::String`]; use
    /// [`SampleValue::as_date`] to read them as timestamps.
    pub fn decode(field: &str, data_type: DataType, raw: &str) -> Result<Self, DecodeError> {
        match data_type {
            DataType::Numeric => raw
                .trim()
                .parse::<f64>()
                .map(SampleValue::Numeric)
                .map_err(|_| DecodeError::InvalidNumber {
                    field: field.to_string(),
                    value: raw.to_string(),
                }),
            DataType::Boolean => match raw.trim().to_lowercase().as_str() {
                "true" => Ok(SampleValue::Boolean(true)),
                "false" => Ok(SampleValue::Boolean(false)),
                _ => Err(DecodeError::InvalidBoolean {
                    field: field.to_string(),
                    value: raw.to_string(),
                }),
            },
            DataType::String => Ok(SampleValue::String(raw.to_string())),
        }
    }

    /// Decodes a value whose tag is still in its stored form.
    pub fn decode_tagged(field: &str, tag: &str, raw: &str) -> Result<Self, DecodeError> {
        let data_type = DataType::from_tag(tag).ok_or_else(|| DecodeError::UnknownTypeTag {
            field: field.to_string(),
            tag: tag.to_string(),
        })?;
        Self::decode(field, data_type, raw)
    }

    /// Returns the number, if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SampleValue::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the flag, if boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SampleValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the text, if a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SampleValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the timestamp, parsing string values in [`TIMESTAMP_FORMAT`].
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            SampleValue::Date(d) => Some(*d),
            SampleValue::String(s) => NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for SampleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl From<f64> for SampleValue {
    fn from(n: f64) -> Self {
        SampleValue::Numeric(n)
    }
}

impl From<i64> for SampleValue {
    fn from(n: i64) -> Self {
        SampleValue::Numeric(n as f64)
    }
}

impl From<bool> for SampleValue {
    fn from(b: bool) -> Self {
        SampleValue::Boolean(b)
    }
}

impl From<&str> for SampleValue {
    fn from(s: &str) -> Self {
        SampleValue::String(s.to_string())
    }
}

impl From<String> for SampleValue {
    fn from(s: String) -> Self {
        SampleValue::String(s)
    }
}

impl From<NaiveDateTime> for SampleValue {
    fn from(d: NaiveDateTime) -> Self {
        SampleValue::Date(d)
    }
}
