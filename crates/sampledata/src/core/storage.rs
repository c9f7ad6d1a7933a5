//! Sample-data storage trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;
use crate::query::{OutputColumn, SampleDataConditions};
use crate::types::{DataType, Field, INSTRUMENT, SampleData, SampleValue};

/// Options for [`SampleDataStorage::store_with`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Update fields that already have a row. When false, only absent fields
    /// are inserted.
    pub overwrite: bool,

    /// Restricts the write to these fields. The insert timestamp is always
    /// written.
    pub fields: Option<Vec<Field>>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            fields: None,
        }
    }
}

impl StoreOptions {
    /// Inserts absent fields only.
    pub fn keep_existing() -> Self {
        Self {
            overwrite: false,
            fields: None,
        }
    }

    /// Restricts the write to the given fields.
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = Some(fields);
        self
    }
}

/// Storage of sample data attached to containers.
///
/// Reads degrade to empty results when the database fails and writes report a
/// plain success flag; failures are logged. [`SampleDataStorage::try_store_with`]
/// returns the structured error for callers that need it.
///
/// # Example
///
/// ```ignore
/// use spectral_sampledata::core::SampleDataStorage;
/// use spectral_sampledata::query::SampleDataConditions;
/// use spectral_sampledata::types::SampleData;
///
/// async fn example<S: SampleDataStorage>(store: &S) {
///     let mut sd = SampleData::new().with("Instrument", "FOSS-1").with("Protein", 11.8);
///     assert!(store.store("S-001", &mut sd).await);
///
///     let loaded = store.load("S-001").await.unwrap();
///     assert!(loaded.contains("Insert timestamp"));
///
///     let ids = store
///         .get_ids(&SampleDataConditions::single().with_instrument("^FOSS"))
///         .await;
///     assert_eq!(ids, vec!["S-001".to_string()]);
/// }
/// ```
#[async_trait]
pub trait SampleDataStorage: Send + Sync {
    /// Returns a human-readable name for the storage backend.
    fn backend_name(&self) -> &'static str;

    /// Loads every field stored for the container.
    ///
    /// Returns an empty set when nothing is stored. Rows whose value cannot
    /// be decoded are logged and skipped.
    async fn load(&self, container_id: &str) -> StorageResult<SampleData>;

    /// Stores the set, inserting absent fields and updating present ones.
    ///
    /// Adds an insert timestamp to `data` if it has none. Fields written
    /// before a failure stay written.
    async fn store(&self, container_id: &str, data: &mut SampleData) -> bool {
        self.store_with(container_id, data, &StoreOptions::default())
            .await
    }

    /// [`SampleDataStorage::store`] with explicit options.
    async fn store_with(
        &self,
        container_id: &str,
        data: &mut SampleData,
        options: &StoreOptions,
    ) -> bool {
        match self.try_store_with(container_id, data, options).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(container_id = %container_id, error = %e, "Failed to store sample data");
                false
            }
        }
    }

    /// [`SampleDataStorage::store`] returning the number of rows written, or
    /// the error that stopped the write.
    async fn try_store(&self, container_id: &str, data: &mut SampleData) -> StorageResult<usize> {
        self.try_store_with(container_id, data, &StoreOptions::default())
            .await
    }

    /// Stores the set and returns the number of rows written.
    async fn try_store_with(
        &self,
        container_id: &str,
        data: &mut SampleData,
        options: &StoreOptions,
    ) -> StorageResult<usize>;

    /// Returns true if at least one row exists for the container.
    async fn exists(&self, container_id: &str) -> bool;

    /// Lists the stored fields, per type tag.
    ///
    /// With `None`, every tag is queried; a name stored under several tags
    /// appears once per tag.
    async fn list_fields(&self, data_type: Option<DataType>) -> Vec<Field>;

    /// Alias of [`SampleDataStorage::list_fields`].
    async fn get_fields(&self, data_type: Option<DataType>) -> Vec<Field> {
        self.list_fields(data_type).await
    }

    /// Lists the distinct values of a field, sorted.
    async fn list_distinct_values(&self, field_name: &str) -> Vec<String>;

    /// Lists the distinct instruments.
    async fn get_instruments(&self) -> Vec<String> {
        self.list_distinct_values(INSTRUMENT).await
    }

    /// Returns the sample IDs of the containers matching the conditions.
    async fn get_ids(&self, conditions: &SampleDataConditions) -> Vec<String> {
        self.get_ids_with_columns(&[OutputColumn::SampleId], conditions)
            .await
    }

    /// Returns the requested columns of the matching containers.
    ///
    /// Several columns are joined with tabs.
    async fn get_ids_with_columns(
        &self,
        columns: &[OutputColumn],
        conditions: &SampleDataConditions,
    ) -> Vec<String>;

    /// Returns the internal numeric IDs of the matching containers.
    async fn get_database_ids(&self, conditions: &SampleDataConditions) -> Vec<i64>;

    /// Sets one field on every listed container (load, modify, store).
    ///
    /// Returns the IDs that could not be updated.
    async fn update_field(
        &self,
        container_ids: &[String],
        field: &Field,
        value: &SampleValue,
    ) -> Vec<String> {
        let mut failed = Vec::new();
        for id in container_ids {
            let mut data = match self.load(id).await {
                Ok(data) => data,
                Err(e) => {
                    tracing::error!(container_id = %id, error = %e, "Failed to load sample data for update");
                    failed.push(id.clone());
                    continue;
                }
            };
            data.insert(field.clone(), value.clone());
            if !self.store(id, &mut data).await {
                failed.push(id.clone());
            }
        }
        failed
    }
}
