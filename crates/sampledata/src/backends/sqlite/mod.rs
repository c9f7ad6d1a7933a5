//! SQLite executor.
//!
//! Supports in-memory databases (great for tests) and file-based databases.
//! SQLite has no built-in regular-expression function, so every pooled
//! connection registers a `regexp(pattern, text)` scalar function backed by
//! the `regex` crate; `text REGEXP pattern` then works as in the other
//! dialects.
//!
//! # Example
//!
//! ```no_run
//! use spectral_sampledata::backends::sqlite::SqliteExecutor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = SqliteExecutor::in_memory()?;
//! let executor = SqliteExecutor::open("./data/sampledata.db")?;
//! # Ok(())
//! # }
//! ```

mod executor;
mod functions;

pub use executor::{SqliteConfig, SqliteExecutor};
