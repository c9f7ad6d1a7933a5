//! The SQL-backed sample-data store.

use std::fmt::{self, Debug};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;

use crate::cache::{CacheInvalidator, ContainerTable};
use crate::config::SampleDataConfig;
use crate::core::{
    ContainerStore, SampleDataStorage, SqlExecutor, SqlParam, SqlRow, SqlValue, StoreOptions,
};
use crate::dialect::{Dialect, dialect_for_product};
use crate::error::{ConcurrencyError, StorageError, StorageResult};
use crate::query::{CompiledQuery, OutputColumn, QueryCompiler, SampleDataConditions};
use crate::schema;
use crate::types::{DataType, FORMAT, Field, INSERT_TIMESTAMP, SampleData, SampleValue};

/// Sample-data store over one database connection.
///
/// The dialect is picked once, from the product name the executor reports.
/// Share one store per database.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use spectral_sampledata::backends::sqlite::SqliteExecutor;
/// use spectral_sampledata::core::SampleDataStorage;
/// use spectral_sampledata::query::{FieldRange, SampleDataConditions};
/// use spectral_sampledata::store::SampleDataStore;
/// use spectral_sampledata::types::{Field, SampleData};
/// use spectral_sampledata::SampleDataConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let executor = Arc::new(SqliteExecutor::open("./sampledata.db")?);
/// let store = SampleDataStore::new(executor, SampleDataConfig::default())?;
/// store.init_schema().await?;
///
/// let mut sd = SampleData::new().with("Instrument", "FOSS-1").with("Protein", 11.8);
/// store.store("S-001", &mut sd).await;
///
/// let conditions = SampleDataConditions::multi()
///     .with_field_range(FieldRange::between(Field::numeric("Protein"), 10.0, 14.0));
/// let ids = store.get_ids(&conditions).await;
/// # Ok(())
/// # }
/// ```
pub struct SampleDataStore {
    executor: Arc<dyn SqlExecutor>,
    dialect: Arc<dyn Dialect>,
    config: SampleDataConfig,
    invalidator: CacheInvalidator,
}

impl Debug for SampleDataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleDataStore")
            .field("executor", &self.executor)
            .field("dialect", &self.dialect.kind())
            .field("config", &self.config)
            .field("invalidator", &self.invalidator)
            .finish()
    }
}

impl SampleDataStore {
    /// Creates a store, selecting the dialect from the executor's product.
    ///
    /// Fails for database products without a dialect adapter.
    pub fn new(executor: Arc<dyn SqlExecutor>, config: SampleDataConfig) -> StorageResult<Self> {
        let dialect = dialect_for_product(executor.product_name())?;
        tracing::info!(
            "Sample-data store on {} using the {} dialect",
            executor.product_name(),
            dialect.kind()
        );
        Ok(Self {
            executor,
            dialect,
            config,
            invalidator: CacheInvalidator::detached(),
        })
    }

    /// Evicts containers from `containers` whenever their sample data changes.
    pub fn with_container_store(mut self, containers: Arc<dyn ContainerStore>) -> Self {
        self.invalidator = CacheInvalidator::new(containers);
        self
    }

    /// The selected dialect.
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// The store configuration.
    pub fn config(&self) -> &SampleDataConfig {
        &self.config
    }

    /// The underlying executor.
    pub fn executor(&self) -> &Arc<dyn SqlExecutor> {
        &self.executor
    }

    /// A SQL container table in the same database, named by the config.
    pub fn container_table(&self) -> ContainerTable {
        ContainerTable::new(
            self.executor.clone(),
            self.dialect.clone(),
            self.config.container_table.clone(),
        )
    }

    /// Creates the metadata table and its indexes if absent.
    pub async fn init_schema(&self) -> StorageResult<()> {
        for stmt in schema::metadata_table_ddl(self.dialect(), &self.config.table_name) {
            self.executor.execute_batch(&stmt).await?;
        }
        tracing::info!("Sample-data table '{}' ready", self.config.table_name);
        Ok(())
    }

    /// Creates a minimal container table if absent.
    pub async fn init_container_schema(&self) -> StorageResult<()> {
        self.container_table().init_schema().await
    }

    /// Verifies the database connection.
    pub async fn health_check(&self) -> StorageResult<()> {
        self.executor.health_check().await
    }

    /// Normalizes and compiles the conditions without running them.
    pub fn compile(
        &self,
        columns: &[OutputColumn],
        conditions: &SampleDataConditions,
    ) -> CompiledQuery {
        let conditions = conditions.clone().check();
        QueryCompiler::new(
            self.dialect(),
            &self.config.table_name,
            &self.config.container_table,
        )
        .compile(columns, &conditions)
    }

    fn table(&self) -> String {
        self.dialect.quote(&self.config.table_name)
    }

    fn ph(&self, index: usize) -> String {
        self.dialect.placeholder(index)
    }

    async fn run_conditions(
        &self,
        columns: &[OutputColumn],
        conditions: &SampleDataConditions,
    ) -> StorageResult<Vec<SqlRow>> {
        let query = self.compile(columns, conditions);
        tracing::debug!(sql = %query.sql, params = query.params.len(), "Running condition query");
        let rows = self.executor.query(&query.sql, &query.params).await?;
        tracing::info!("Found {} matching containers", rows.len());
        Ok(rows)
    }

    async fn row_exists(&self, container_id: &str, name: &str) -> StorageResult<bool> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE ID = {} AND NAME = {}",
            self.table(),
            self.ph(1),
            self.ph(2)
        );
        let rows = self
            .executor
            .query(&sql, &[SqlParam::string(container_id), SqlParam::string(name)])
            .await?;
        Ok(!rows.is_empty())
    }

    /// Inserts or updates one row. Returns false if the row was left alone.
    async fn write_field(
        &self,
        container_id: &str,
        field: &Field,
        value: &SampleValue,
        overwrite: bool,
    ) -> StorageResult<bool> {
        let encoded = value.encode();
        // The tag follows the value so it always decodes back
        let tag = value.data_type().tag();

        if self.row_exists(container_id, field.name()).await? {
            if !overwrite {
                return Ok(false);
            }
            let sql = format!(
                "UPDATE {} SET VALUE = {}, TYPE = {} WHERE ID = {} AND NAME = {}",
                self.table(),
                self.ph(1),
                self.ph(2),
                self.ph(3),
                self.ph(4)
            );
            self.executor
                .execute(
                    &sql,
                    &[
                        SqlParam::string(encoded),
                        SqlParam::string(tag),
                        SqlParam::string(container_id),
                        SqlParam::string(field.name()),
                    ],
                )
                .await?;
        } else {
            let sql = format!(
                "INSERT INTO {} (ID, NAME, TYPE, VALUE) VALUES ({}, {}, {}, {})",
                self.table(),
                self.ph(1),
                self.ph(2),
                self.ph(3),
                self.ph(4)
            );
            self.executor
                .execute(
                    &sql,
                    &[
                        SqlParam::string(container_id),
                        SqlParam::string(field.name()),
                        SqlParam::string(tag),
                        SqlParam::string(encoded),
                    ],
                )
                .await
                .map_err(|e| {
                    if e.is_unique_violation() {
                        StorageError::Concurrency(ConcurrencyError::WriteConflict {
                            container_id: container_id.to_string(),
                            field: field.name().to_string(),
                        })
                    } else {
                        e
                    }
                })?;
        }
        Ok(true)
    }
}

#[async_trait]
impl SampleDataStorage for SampleDataStore {
    fn backend_name(&self) -> &'static str {
        self.executor.backend_name()
    }

    async fn load(&self, container_id: &str) -> StorageResult<SampleData> {
        let sql = format!(
            "SELECT NAME, TYPE, VALUE FROM {} WHERE ID = {}",
            self.table(),
            self.ph(1)
        );
        let rows = self
            .executor
            .query(&sql, &[SqlParam::string(container_id)])
            .await?;

        let mut data = SampleData::new();
        for row in rows {
            let mut cells = row.iter().map(SqlValue::as_text);
            let (name, tag, raw) = match (cells.next(), cells.next(), cells.next()) {
                (Some(name), Some(tag), Some(raw)) => (name, tag, raw),
                _ => continue,
            };
            match SampleValue::decode_tagged(&name, &tag, &raw) {
                Ok(value) => {
                    let data_type = DataType::from_tag(&tag).unwrap_or(DataType::String);
                    data.insert(Field::new(name, data_type), value);
                }
                Err(e) => {
                    tracing::warn!(
                        container_id = %container_id,
                        error = %e,
                        "Skipping undecodable sample-data field"
                    );
                }
            }
        }
        Ok(data)
    }

    async fn try_store_with(
        &self,
        container_id: &str,
        data: &mut SampleData,
        options: &StoreOptions,
    ) -> StorageResult<usize> {
        if container_id.is_empty() {
            return Err(StorageError::EmptyContainerId);
        }
        data.ensure_insert_timestamp(Local::now().naive_local());
        let format = data.format();

        let mut written = 0;
        let mut failure = None;
        for (field, value) in data.iter() {
            if field.name() == FORMAT {
                continue;
            }
            if let Some(only) = &options.fields {
                if field.name() != INSERT_TIMESTAMP && !only.contains(field) {
                    continue;
                }
            }
            match self
                .write_field(container_id, field, value, options.overwrite)
                .await
            {
                Ok(true) => written += 1,
                Ok(false) => {}
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        // Rows written before a failure stay written, so the cache is stale either way
        if written > 0 {
            self.invalidator
                .invalidate(container_id, format.as_deref())
                .await;
        }
        tracing::debug!(
            container_id = %container_id,
            written,
            "Stored sample data"
        );

        match failure {
            Some(e) => Err(e),
            None => Ok(written),
        }
    }

    async fn exists(&self, container_id: &str) -> bool {
        let sql = format!(
            "SELECT 1 FROM {} WHERE ID = {} {}",
            self.table(),
            self.ph(1),
            self.dialect.limit_clause(1)
        );
        match self
            .executor
            .query(&sql, &[SqlParam::string(container_id)])
            .await
        {
            Ok(rows) => !rows.is_empty(),
            Err(e) => {
                tracing::error!("Failed to check sample data of {}: {}", container_id, e);
                false
            }
        }
    }

    async fn list_fields(&self, data_type: Option<DataType>) -> Vec<Field> {
        let types: Vec<DataType> = match data_type {
            Some(dt) => vec![dt],
            None => DataType::ALL.to_vec(),
        };
        let sql = format!(
            "SELECT DISTINCT NAME FROM {} WHERE TYPE = {} ORDER BY NAME",
            self.table(),
            self.ph(1)
        );

        let mut fields = Vec::new();
        for dt in types {
            match self
                .executor
                .query(&sql, &[SqlParam::string(dt.tag())])
                .await
            {
                Ok(rows) => fields.extend(
                    rows.iter()
                        .filter_map(|row| row.first())
                        .map(|name| Field::new(name.as_text(), dt)),
                ),
                Err(e) => {
                    tracing::error!("Failed to list {} fields: {}", dt, e);
                    return Vec::new();
                }
            }
        }
        fields
    }

    async fn list_distinct_values(&self, field_name: &str) -> Vec<String> {
        let sql = format!(
            "SELECT DISTINCT VALUE FROM {} WHERE NAME = {}",
            self.table(),
            self.ph(1)
        );
        match self
            .executor
            .query(&sql, &[SqlParam::string(field_name)])
            .await
        {
            Ok(rows) => {
                let mut values: Vec<String> = rows
                    .iter()
                    .filter_map(|row| row.first())
                    .filter(|v| !v.is_null())
                    .map(SqlValue::as_text)
                    .collect();
                values.sort();
                values
            }
            Err(e) => {
                tracing::error!("Failed to list values of '{}': {}", field_name, e);
                Vec::new()
            }
        }
    }

    async fn get_ids_with_columns(
        &self,
        columns: &[OutputColumn],
        conditions: &SampleDataConditions,
    ) -> Vec<String> {
        match self.run_conditions(columns, conditions).await {
            Ok(rows) => rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(SqlValue::as_text)
                        .collect::<Vec<_>>()
                        .join("\t")
                })
                .collect(),
            Err(e) => {
                tracing::error!("Condition query failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn get_database_ids(&self, conditions: &SampleDataConditions) -> Vec<i64> {
        match self
            .run_conditions(&[OutputColumn::DatabaseId], conditions)
            .await
        {
            Ok(rows) => rows
                .iter()
                .filter_map(|row| row.first().and_then(SqlValue::as_i64))
                .collect(),
            Err(e) => {
                tracing::error!("Condition query failed: {}", e);
                Vec::new()
            }
        }
    }
}
