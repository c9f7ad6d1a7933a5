//! Core types of the sample-data store.
//!
//! - [`Field`], [`DataType`] - metadata slot identifiers and type tags
//! - [`SampleValue`] - decoded values and the stored-string codec
//! - [`SampleData`] - the field/value set of one container
//! - [`ContainerRef`] - identifiers of the owning container
//!
//! # Example
//!
//! ```
//! use spectral_sampledata::types::{DataType, SampleData, INSTRUMENT};
//!
//! let sd = SampleData::new()
//!     .with(INSTRUMENT, "FOSS-1")
//!     .with("Protein", 11.8)
//!     .with("Dummy report", false);
//!
//! assert_eq!(sd.field("Protein").unwrap().data_type(), DataType::Numeric);
//! assert_eq!(sd.instrument().as_deref(), Some("FOSS-1"));
//! ```

mod container;
mod field;
mod sample_data;
mod value;

pub use container::ContainerRef;
pub use field::{DataType, Field};
pub use sample_data::{
    DUMMY_REPORT, FORMAT, INSERT_TIMESTAMP, INSTRUMENT, SAMPLE_TYPE, SampleData,
};
pub use value::{SampleValue, TIMESTAMP_FORMAT};
