//! The in-memory sample-data set of one container.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::field::{DataType, Field};
use super::value::{SampleValue, TIMESTAMP_FORMAT};

/// Field holding the time the sample data was first stored.
pub const INSERT_TIMESTAMP: &str = "Insert timestamp";

/// Field holding the container format. Owned by the container, never written
/// as a metadata row.
pub const FORMAT: &str = "Format";

/// Field holding the instrument name.
pub const INSTRUMENT: &str = "Instrument";

/// Field holding the sample type.
pub const SAMPLE_TYPE: &str = "Sample type";

/// Boolean field marking placeholder ("dummy") reports.
pub const DUMMY_REPORT: &str = "Dummy report";

/// Ordered mapping of fields to decoded values.
///
/// Ordering is by field name. Inserting a value for an existing name replaces
/// both the value and the field's type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleData {
    values: BTreeMap<Field, SampleValue>,
}

impl SampleData {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, using the value's own type for the field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<SampleValue>) {
        let value = value.into();
        let field = Field::new(name, value.data_type());
        self.insert(field, value);
    }

    /// Sets a value under an explicit field.
    pub fn insert(&mut self, field: Field, value: SampleValue) {
        // BTreeMap keeps the old key on insert, so drop it to refresh the type
        self.values.remove(&field);
        self.values.insert(field, value);
    }

    /// Builder-style [`SampleData::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SampleValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Looks up a value by field name.
    pub fn get(&self, name: &str) -> Option<&SampleValue> {
        self.values.get(&Field::new(name, DataType::String))
    }

    /// Looks up the stored field (with its type) by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.values
            .get_key_value(&Field::new(name, DataType::String))
            .map(|(f, _)| f)
    }

    /// Returns true if a value is present for the name.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes a field.
    pub fn remove(&mut self, name: &str) -> Option<SampleValue> {
        self.values.remove(&Field::new(name, DataType::String))
    }

    /// Returns the value as its stored string.
    pub fn string_value(&self, name: &str) -> Option<String> {
        self.get(name).map(SampleValue::encode)
    }

    /// The container format, if present.
    pub fn format(&self) -> Option<String> {
        self.string_value(FORMAT)
    }

    /// The instrument, if present.
    pub fn instrument(&self) -> Option<String> {
        self.string_value(INSTRUMENT)
    }

    /// The insert timestamp, if present and parseable.
    pub fn insert_timestamp(&self) -> Option<NaiveDateTime> {
        self.get(INSERT_TIMESTAMP).and_then(SampleValue::as_date)
    }

    /// Adds the insert timestamp if missing. Returns true if it was added.
    pub fn ensure_insert_timestamp(&mut self, now: NaiveDateTime) -> bool {
        if self.contains(INSERT_TIMESTAMP) {
            return false;
        }
        self.insert(
            Field::string(INSERT_TIMESTAMP),
            SampleValue::String(now.format(TIMESTAMP_FORMAT).to_string()),
        );
        true
    }

    /// Copies every value of `other` into this set, replacing duplicates.
    pub fn merge(&mut self, other: &SampleData) {
        for (field, value) in other.iter() {
            self.insert(field.clone(), value.clone());
        }
    }

    /// Iterates over fields and values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Field, &SampleValue)> {
        self.values.iter()
    }

    /// The fields in name order.
    pub fn fields(&self) -> Vec<Field> {
        self.values.keys().cloned().collect()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
