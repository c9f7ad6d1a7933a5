//! Search conditions and the SQL compiler.
//!
//! - [`SampleDataConditions`] - what to search for
//! - [`QueryCompiler`] - turns conditions into a [`CompiledQuery`]

mod compiler;
mod conditions;

pub use compiler::{CompiledQuery, OutputColumn, QueryCompiler};
pub use conditions::{FieldFilters, FieldRange, MATCH_ALL, SampleDataConditions};
