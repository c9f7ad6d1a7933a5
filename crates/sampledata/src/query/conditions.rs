//! Search conditions over sample data.
//!
//! [`SampleDataConditions`] describes which containers a query should return.
//! It comes in two shapes: the single-field shape carries one numeric range
//! and one required field, the multi-field shape carries lists of both. The
//! query compiler reduces both to lists, so a single-field condition is simply
//! a list of length one.
//!
//! # Example
//!
//! ```
//! use spectral_sampledata::query::{FieldRange, SampleDataConditions};
//! use spectral_sampledata::types::Field;
//!
//! let conditions = SampleDataConditions::multi()
//!     .with_instrument("^FOSS")
//!     .with_field_range(FieldRange::between(Field::numeric("Protein"), 10.0, 14.0))
//!     .with_required_field(Field::numeric("Moisture"))
//!     .with_exclude_dummies(true)
//!     .with_latest(true)
//!     .with_limit(50)
//!     .check();
//!
//! assert_eq!(conditions.field_ranges().len(), 1);
//! assert_eq!(conditions.limit(), 50);
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::Field;

/// The regular expression that matches everything; treated as "no filter".
pub const MATCH_ALL: &str = ".*";

/// A numeric range over one field.
///
/// A missing bound does not filter. An empty field name disables the range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRange {
    /// The field to compare.
    pub field: Field,
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Inclusive upper bound.
    pub max: Option<f64>,
}

impl FieldRange {
    /// A range without bounds; the field only has to be present.
    pub fn new(field: Field) -> Self {
        Self {
            field,
            min: None,
            max: None,
        }
    }

    /// A range with both bounds.
    pub fn between(field: Field, min: f64, max: f64) -> Self {
        Self {
            field,
            min: Some(min),
            max: Some(max),
        }
    }

    /// Builds a range from bounds where a negative value means "unbounded".
    pub fn from_bounds(field: Field, min: f64, max: f64) -> Self {
        Self {
            field,
            min: unbounded_if_negative(Some(min)),
            max: unbounded_if_negative(Some(max)),
        }
    }

    /// Sets the lower bound.
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the upper bound.
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Returns true if the range takes part in the query.
    pub fn is_active(&self) -> bool {
        !self.field.is_empty()
    }
}

fn unbounded_if_negative(bound: Option<f64>) -> Option<f64> {
    bound.filter(|b| *b >= 0.0)
}

fn normalize_regexp(regexp: Option<String>) -> Option<String> {
    regexp.filter(|r| !r.is_empty() && r != MATCH_ALL)
}

/// Field-specific part of the conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum FieldFilters {
    /// One range and one required field.
    Single {
        /// The numeric range.
        range: FieldRange,
        /// A field that must be present, value ignored.
        required: Field,
    },
    /// Any number of ranges and required fields.
    Multi {
        /// The numeric ranges.
        ranges: Vec<FieldRange>,
        /// Fields that must be present, values ignored.
        required: Vec<Field>,
    },
}

/// Conditions the containers returned by a query must meet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDataConditions {
    sample_id_regexp: Option<String>,
    format_regexp: Option<String>,
    instrument_regexp: Option<String>,
    sample_type_regexp: Option<String>,
    start_date: Option<NaiveDateTime>,
    end_date: Option<NaiveDateTime>,
    exclude_dummies: bool,
    only_dummies: bool,
    latest: bool,
    limit: usize,
    filters: FieldFilters,
}

impl SampleDataConditions {
    fn with_filters(filters: FieldFilters) -> Self {
        Self {
            sample_id_regexp: None,
            format_regexp: None,
            instrument_regexp: None,
            sample_type_regexp: None,
            start_date: None,
            end_date: None,
            exclude_dummies: false,
            only_dummies: false,
            latest: false,
            limit: 0,
            filters,
        }
    }

    /// Single-field conditions with every filter disabled.
    pub fn single() -> Self {
        Self::with_filters(FieldFilters::Single {
            range: FieldRange::new(Field::numeric("")),
            required: Field::numeric(""),
        })
    }

    /// Multi-field conditions with every filter disabled.
    pub fn multi() -> Self {
        Self::with_filters(FieldFilters::Multi {
            ranges: Vec::new(),
            required: Vec::new(),
        })
    }

    /// Filters the container sample ID by regular expression.
    pub fn with_sample_id(mut self, regexp: impl Into<String>) -> Self {
        self.sample_id_regexp = Some(regexp.into());
        self
    }

    /// Filters the container format by regular expression.
    pub fn with_format(mut self, regexp: impl Into<String>) -> Self {
        self.format_regexp = Some(regexp.into());
        self
    }

    /// Filters the instrument field by regular expression.
    pub fn with_instrument(mut self, regexp: impl Into<String>) -> Self {
        self.instrument_regexp = Some(regexp.into());
        self
    }

    /// Filters the sample-type field by regular expression.
    pub fn with_sample_type(mut self, regexp: impl Into<String>) -> Self {
        self.sample_type_regexp = Some(regexp.into());
        self
    }

    /// Inclusive lower bound on the insert timestamp.
    pub fn with_start_date(mut self, start: NaiveDateTime) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Inclusive upper bound on the insert timestamp.
    pub fn with_end_date(mut self, end: NaiveDateTime) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Only return containers explicitly marked as not being dummies.
    pub fn with_exclude_dummies(mut self, exclude: bool) -> Self {
        self.exclude_dummies = exclude;
        self
    }

    /// Only return containers marked as dummies.
    pub fn with_only_dummies(mut self, only: bool) -> Self {
        self.only_dummies = only;
        self
    }

    /// Newest insert timestamp first instead of oldest first.
    pub fn with_latest(mut self, latest: bool) -> Self {
        self.latest = latest;
        self
    }

    /// Maximum number of results, 0 for unlimited.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Adds a numeric range. Replaces the range of single-field conditions.
    pub fn with_field_range(mut self, new_range: FieldRange) -> Self {
        match &mut self.filters {
            FieldFilters::Single { range, .. } => *range = new_range,
            FieldFilters::Multi { ranges, .. } => ranges.push(new_range),
        }
        self
    }

    /// Adds a required field. Replaces the field of single-field conditions.
    pub fn with_required_field(mut self, field: Field) -> Self {
        match &mut self.filters {
            FieldFilters::Single { required, .. } => *required = field,
            FieldFilters::Multi { required, .. } => required.push(field),
        }
        self
    }

    /// Normalizes the conditions before compilation.
    ///
    /// Empty and match-all regular expressions are dropped and negative
    /// numeric bounds become unbounded.
    pub fn check(mut self) -> Self {
        self.sample_id_regexp = normalize_regexp(self.sample_id_regexp.take());
        self.format_regexp = normalize_regexp(self.format_regexp.take());
        self.instrument_regexp = normalize_regexp(self.instrument_regexp.take());
        self.sample_type_regexp = normalize_regexp(self.sample_type_regexp.take());

        let ranges: Vec<&mut FieldRange> = match &mut self.filters {
            FieldFilters::Single { range, .. } => vec![range],
            FieldFilters::Multi { ranges, .. } => ranges.iter_mut().collect(),
        };
        for range in ranges {
            range.min = unbounded_if_negative(range.min);
            range.max = unbounded_if_negative(range.max);
        }
        self
    }

    /// The sample-ID regular expression.
    pub fn sample_id_regexp(&self) -> Option<&str> {
        self.sample_id_regexp.as_deref()
    }

    /// The format regular expression.
    pub fn format_regexp(&self) -> Option<&str> {
        self.format_regexp.as_deref()
    }

    /// The instrument regular expression.
    pub fn instrument_regexp(&self) -> Option<&str> {
        self.instrument_regexp.as_deref()
    }

    /// The sample-type regular expression.
    pub fn sample_type_regexp(&self) -> Option<&str> {
        self.sample_type_regexp.as_deref()
    }

    /// The lower insert-timestamp bound.
    pub fn start_date(&self) -> Option<NaiveDateTime> {
        self.start_date
    }

    /// The upper insert-timestamp bound.
    pub fn end_date(&self) -> Option<NaiveDateTime> {
        self.end_date
    }

    /// Whether dummies are excluded.
    pub fn exclude_dummies(&self) -> bool {
        self.exclude_dummies
    }

    /// Whether only dummies are returned.
    pub fn only_dummies(&self) -> bool {
        self.only_dummies
    }

    /// Whether the newest containers come first.
    pub fn latest(&self) -> bool {
        self.latest
    }

    /// The result limit, 0 for unlimited.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The field-specific filters.
    pub fn filters(&self) -> &FieldFilters {
        &self.filters
    }

    /// The numeric ranges, as a list regardless of shape.
    pub fn field_ranges(&self) -> Vec<&FieldRange> {
        match &self.filters {
            FieldFilters::Single { range, .. } => vec![range],
            FieldFilters::Multi { ranges, .. } => ranges.iter().collect(),
        }
    }

    /// The required fields, as a list regardless of shape.
    pub fn required_fields(&self) -> Vec<&Field> {
        match &self.filters {
            FieldFilters::Single { required, .. } => vec![required],
            FieldFilters::Multi { required, .. } => required.iter().collect(),
        }
    }
}

impl Default for SampleDataConditions {
    fn default() -> Self {
        Self::single()
    }
}
