//! PostgreSQL executor.
//!
//! Connections come from a `deadpool-postgres` pool. Regular expressions use
//! the native `~` operator, so no extension is needed.
//!
//! # Example
//!
//! ```no_run
//! use spectral_sampledata::backends::postgres::{PostgresConfig, PostgresExecutor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = PostgresExecutor::new(PostgresConfig::default()).await?;
//! let executor =
//!     PostgresExecutor::from_connection_string("postgres://lab:secret@db:5432/spectra").await?;
//! let executor = PostgresExecutor::from_env().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod executor;

pub use config::{PostgresConfig, PostgresSslMode};
pub use executor::PostgresExecutor;
