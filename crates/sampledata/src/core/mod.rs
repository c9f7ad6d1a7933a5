//! Core traits and abstractions.
//!
//! - [`SampleDataStorage`] - load/store/query operations on sample data
//! - [`SqlExecutor`] - database driver abstraction
//! - [`ContainerStore`] - the collaborator owning containers and their cache

pub mod container;
pub mod executor;
pub mod storage;

pub use container::ContainerStore;
pub use executor::{SqlExecutor, SqlParam, SqlRow, SqlValue};
pub use storage::{SampleDataStorage, StoreOptions};
