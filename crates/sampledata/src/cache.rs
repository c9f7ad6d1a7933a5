//! Container cache coherence.
//!
//! Containers are cached by the container store, and a cached container
//! carries a view of its sample data. After sample data is written, the
//! container owning it has to be evicted so the next read sees the new
//! values. [`CacheInvalidator`] does that through the [`ContainerStore`]
//! collaborator; [`ContainerTable`] is a SQL-backed container store for
//! deployments (and tests) without one of their own.

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::core::{ContainerStore, SqlExecutor, SqlParam, SqlValue};
use crate::dialect::Dialect;
use crate::error::{BackendError, StorageError, StorageResult};
use crate::schema;
use crate::types::ContainerRef;

/// Evicts containers whose sample data changed.
#[derive(Clone, Default)]
pub struct CacheInvalidator {
    containers: Option<Arc<dyn ContainerStore>>,
}

impl Debug for CacheInvalidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheInvalidator")
            .field("attached", &self.containers.is_some())
            .finish()
    }
}

impl CacheInvalidator {
    /// An invalidator that does nothing.
    pub fn detached() -> Self {
        Self { containers: None }
    }

    /// An invalidator evicting from the given container store.
    pub fn new(containers: Arc<dyn ContainerStore>) -> Self {
        Self {
            containers: Some(containers),
        }
    }

    /// Returns true if a container store is attached.
    pub fn is_attached(&self) -> bool {
        self.containers.is_some()
    }

    /// Resolves the container and evicts it from the cache.
    ///
    /// Never fails: a container that cannot be resolved has nothing cached.
    pub async fn invalidate(&self, sample_id: &str, format: Option<&str>) {
        let Some(containers) = &self.containers else {
            return;
        };
        match containers.load(sample_id, format).await {
            Ok(Some(container)) => {
                containers.evict_cache(container.auto_id).await;
                tracing::debug!(
                    sample_id = %sample_id,
                    auto_id = container.auto_id,
                    "Evicted container from cache"
                );
            }
            Ok(None) => {
                tracing::debug!(sample_id = %sample_id, "No container to evict");
            }
            Err(e) => {
                tracing::warn!(
                    sample_id = %sample_id,
                    error = %e,
                    "Failed to resolve container for cache eviction"
                );
            }
        }
    }
}

/// A container table in the same database, with an in-process cache.
pub struct ContainerTable {
    executor: Arc<dyn SqlExecutor>,
    dialect: Arc<dyn Dialect>,
    table: String,
    cache: RwLock<HashMap<i64, ContainerRef>>,
}

impl Debug for ContainerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerTable")
            .field("table", &self.table)
            .field("cached", &self.cache.read().len())
            .finish_non_exhaustive()
    }
}

impl ContainerTable {
    /// Creates a container table accessor.
    pub fn new(
        executor: Arc<dyn SqlExecutor>,
        dialect: Arc<dyn Dialect>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            dialect,
            table: table.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Creates the table if absent.
    pub async fn init_schema(&self) -> StorageResult<()> {
        for stmt in schema::container_table_ddl(self.dialect.as_ref(), &self.table) {
            self.executor.execute_batch(&stmt).await?;
        }
        Ok(())
    }

    /// Inserts a container and returns it with its generated ID.
    pub async fn add(&self, sample_id: &str, format: &str) -> StorageResult<ContainerRef> {
        let table = self.dialect.quote(&self.table);
        let p1 = self.dialect.placeholder(1);
        let p2 = self.dialect.placeholder(2);

        self.executor
            .execute(
                &format!("INSERT INTO {table} (SAMPLEID, FORMAT) VALUES ({p1}, {p2})"),
                &[SqlParam::string(sample_id), SqlParam::string(format)],
            )
            .await?;

        let rows = self
            .executor
            .query(
                &format!("SELECT MAX(AUTO_ID) FROM {table} WHERE SAMPLEID = {p1} AND FORMAT = {p2}"),
                &[SqlParam::string(sample_id), SqlParam::string(format)],
            )
            .await?;
        let auto_id = rows
            .first()
            .and_then(|row| row.first())
            .and_then(SqlValue::as_i64)
            .ok_or_else(|| {
                StorageError::Backend(BackendError::QueryError {
                    message: format!("no generated id for container '{sample_id}'"),
                })
            })?;

        Ok(ContainerRef::new(auto_id, sample_id, format))
    }

    /// Returns the cached container, if any.
    pub fn cached(&self, auto_id: i64) -> Option<ContainerRef> {
        self.cache.read().get(&auto_id).cloned()
    }

    /// Number of cached containers.
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }
}

#[async_trait]
impl ContainerStore for ContainerTable {
    async fn load(
        &self,
        sample_id: &str,
        format: Option<&str>,
    ) -> StorageResult<Option<ContainerRef>> {
        let table = self.dialect.quote(&self.table);
        let mut sql = format!(
            "SELECT AUTO_ID, SAMPLEID, FORMAT FROM {table} WHERE SAMPLEID = {}",
            self.dialect.placeholder(1)
        );
        let mut params = vec![SqlParam::string(sample_id)];
        if let Some(format) = format {
            sql.push_str(&format!(" AND FORMAT = {}", self.dialect.placeholder(2)));
            params.push(SqlParam::string(format));
        }
        sql.push_str(" ORDER BY AUTO_ID DESC ");
        sql.push_str(&self.dialect.limit_clause(1));

        let rows = self.executor.query(&sql, &params).await?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };
        let Some(auto_id) = row.first().and_then(SqlValue::as_i64) else {
            return Ok(None);
        };
        let container = ContainerRef::new(
            auto_id,
            row.get(1).map(SqlValue::as_text).unwrap_or_default(),
            row.get(2).map(SqlValue::as_text).unwrap_or_default(),
        );

        self.cache.write().insert(auto_id, container.clone());
        Ok(Some(container))
    }

    async fn evict_cache(&self, auto_id: i64) {
        self.cache.write().remove(&auto_id);
    }
}
