//! References to the data containers (spectra) that own sample data.

use serde::{Deserialize, Serialize};

/// A container as seen by the metadata store.
///
/// The container itself lives in the container store; only the identifiers
/// needed for joins and cache eviction are carried here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerRef {
    /// Internal numeric identifier, used as the cache key.
    pub auto_id: i64,
    /// External alphanumeric sample ID, joined against `ID` of the metadata rows.
    pub sample_id: String,
    /// Data format of the container.
    pub format: String,
}

impl ContainerRef {
    /// Creates a container reference.
    pub fn new(auto_id: i64, sample_id: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            auto_id,
            sample_id: sample_id.into(),
            format: format.into(),
        }
    }
}
