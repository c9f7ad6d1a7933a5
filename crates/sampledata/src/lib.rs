//! Sample-Data Store
//!
//! This crate stores free-form, typed metadata ("sample data") attached to
//! data containers such as spectra, and answers condition queries against it.
//! Metadata lives in a narrow entity-attribute-value table, one row per
//! container and field; queries are compiled into a single SQL statement that
//! self-joins that table once per predicate.
//!
//! # Features
//!
//! - **Typed values**: numeric, string and boolean fields behind a one-letter tag
//! - **Condition queries**: regexp, numeric range, date range, required-field
//!   and dummy-flag filters, ordered by insert time and optionally limited
//! - **Portable SQL**: SQLite, PostgreSQL and MySQL/MariaDB dialects, with
//!   every literal bound as a parameter
//! - **Cache coherence**: writes evict the owning container from its cache
//!
//! # Backend Features
//!
//! - `sqlite` (default) - SQLite with in-memory and file modes
//! - `postgres` - PostgreSQL via `tokio-postgres`
//!
//! # Architecture
//!
//! - [`types`] - fields, values and the per-container sample-data set
//! - [`query`] - condition model and SQL compiler
//! - [`dialect`] - per-database SQL fragments
//! - [`core`] - storage, executor and container-store traits
//! - [`store`] - the SQL-backed store
//! - [`cache`] - container cache invalidation
//! - [`backends`] - SQLite and PostgreSQL executors
//! - [`factory`] - opening a store from a URL
//! - [`error`] - error types for all operations
//!
//! # Quick Start
//!
//! ```no_run
//! use spectral_sampledata::core::SampleDataStorage;
//! use spectral_sampledata::query::{FieldRange, SampleDataConditions};
//! use spectral_sampledata::types::{Field, SampleData, INSTRUMENT};
//! use spectral_sampledata::{SampleDataConfig, factory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = factory::connect("sqlite://./sampledata.db", SampleDataConfig::default()).await?;
//! store.init_schema().await?;
//!
//! let mut sd = SampleData::new()
//!     .with(INSTRUMENT, "FOSS-1")
//!     .with("Protein", 11.8)
//!     .with("Dummy report", false);
//! store.store("S-001", &mut sd).await;
//!
//! let conditions = SampleDataConditions::multi()
//!     .with_instrument("^FOSS")
//!     .with_field_range(FieldRange::between(Field::numeric("Protein"), 10.0, 14.0))
//!     .with_exclude_dummies(true)
//!     .with_latest(true)
//!     .with_limit(20);
//! for id in store.get_ids(&conditions).await {
//!     println!("{id}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod cache;
pub mod config;
pub mod core;
pub mod dialect;
pub mod error;
pub mod factory;
pub mod query;
pub mod schema;
pub mod store;
pub mod types;

// Re-export commonly used types at crate root
pub use config::SampleDataConfig;
pub use error::{StorageError, StorageResult};
pub use store::SampleDataStore;
pub use types::{DataType, Field, SampleData, SampleValue};

// Re-export core traits
pub use core::{ContainerStore, SampleDataStorage, SqlExecutor};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
