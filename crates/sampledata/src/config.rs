//! Store configuration.

use serde::{Deserialize, Serialize};

/// Configuration of a [`SampleDataStore`](crate::store::SampleDataStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleDataConfig {
    /// Name of the metadata table (`ID`, `NAME`, `TYPE`, `VALUE`).
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Name of the container table (`AUTO_ID`, `SAMPLEID`, `FORMAT`).
    #[serde(default = "default_container_table")]
    pub container_table: String,
}

fn default_table_name() -> String {
    "sampledata".to_string()
}

fn default_container_table() -> String {
    "spectrum".to_string()
}

impl Default for SampleDataConfig {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
            container_table: default_container_table(),
        }
    }
}

impl SampleDataConfig {
    /// Uses a different metadata table.
    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Uses a different container table.
    pub fn with_container_table(mut self, name: impl Into<String>) -> Self {
        self.container_table = name.into();
        self
    }
}
