//! Metadata field identifiers and their type tags.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type tag stored in the one-character `TYPE` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Numeric value, stored as its decimal string (`N`).
    Numeric,
    /// Free text, including timestamps (`S`).
    String,
    /// `true` / `false` (`B`).
    Boolean,
}

impl DataType {
    /// Every tag, in the order `list_fields` queries them.
    pub const ALL: [DataType; 3] = [DataType::Numeric, DataType::String, DataType::Boolean];

    /// The tag as stored in the `TYPE` column.
    pub fn tag(&self) -> &'static str {
        match self {
            DataType::Numeric => "N",
            DataType::String => "S",
            DataType::Boolean => "B",
        }
    }

    /// Parses a stored tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "N" | "n" => Some(DataType::Numeric),
            "S" | "s" => Some(DataType::String),
            "B" | "b" => Some(DataType::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Numeric => write!(f, "numeric"),
            DataType::String => write!(f, "string"),
            DataType::Boolean => write!(f, "boolean"),
        }
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(dt) = DataType::from_tag(s) {
            return Ok(dt);
        }
        match s.to_lowercase().as_str() {
            "numeric" => Ok(DataType::Numeric),
            "string" => Ok(DataType::String),
            "boolean" => Ok(DataType::Boolean),
            _ => Err(format!("unknown data type: {}", s)),
        }
    }
}

/// One metadata slot.
///
/// Two fields are equal when their names are equal; the type only guides
/// decoding of the stored value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    name: String,
    data_type: DataType,
}

impl Field {
    /// Creates a field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// Shorthand for a numeric field.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Numeric)
    }

    /// Shorthand for a string field.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, DataType::String)
    }

    /// Shorthand for a boolean field.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Boolean)
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The advisory type.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// An empty name disables any filter built from this field.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Field {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.data_type.tag())
    }
}
