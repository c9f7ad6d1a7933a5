//! Test infrastructure for the sample-data store.
//!
//! Provides a recording container store, a fake executor for products
//! without an adapter, and helpers for building timestamped sample data.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;

use spectral_sampledata::core::{ContainerStore, SqlExecutor, SqlParam, SqlRow};
use spectral_sampledata::error::{BackendError, StorageError, StorageResult};
use spectral_sampledata::types::{ContainerRef, INSERT_TIMESTAMP, SampleData, TIMESTAMP_FORMAT};

/// Container store double that records every call.
#[derive(Debug, Default)]
pub struct RecordingContainerStore {
    containers: Mutex<HashMap<String, ContainerRef>>,
    loads: Mutex<Vec<(String, Option<String>)>>,
    evictions: Mutex<Vec<i64>>,
    fail_loads: bool,
}

impl RecordingContainerStore {
    /// A store whose loads succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose loads always fail.
    pub fn failing() -> Self {
        Self {
            fail_loads: true,
            ..Self::default()
        }
    }

    /// Registers a container.
    pub fn register(&self, auto_id: i64, sample_id: &str, format: &str) -> ContainerRef {
        let container = ContainerRef::new(auto_id, sample_id, format);
        self.containers
            .lock()
            .insert(sample_id.to_string(), container.clone());
        container
    }

    /// The `(sample_id, format)` pairs passed to `load`.
    pub fn loads(&self) -> Vec<(String, Option<String>)> {
        self.loads.lock().clone()
    }

    /// The evicted container IDs, in order.
    pub fn evictions(&self) -> Vec<i64> {
        self.evictions.lock().clone()
    }
}

#[async_trait]
impl ContainerStore for RecordingContainerStore {
    async fn load(
        &self,
        sample_id: &str,
        format: Option<&str>,
    ) -> StorageResult<Option<ContainerRef>> {
        self.loads
            .lock()
            .push((sample_id.to_string(), format.map(String::from)));
        if self.fail_loads {
            return Err(StorageError::Backend(BackendError::Unavailable {
                backend_name: "recording".to_string(),
                message: "container store offline".to_string(),
            }));
        }
        Ok(self.containers.lock().get(sample_id).cloned())
    }

    async fn evict_cache(&self, auto_id: i64) {
        self.evictions.lock().push(auto_id);
    }
}

/// Executor reporting an arbitrary product name; every statement fails.
#[derive(Debug)]
pub struct FakeExecutor {
    pub product: String,
}

impl FakeExecutor {
    pub fn new(product: &str) -> Self {
        Self {
            product: product.to_string(),
        }
    }

    fn unavailable() -> StorageError {
        StorageError::Backend(BackendError::Unavailable {
            backend_name: "fake".to_string(),
            message: "no database".to_string(),
        })
    }
}

#[async_trait]
impl SqlExecutor for FakeExecutor {
    fn backend_name(&self) -> &'static str {
        "fake"
    }

    fn product_name(&self) -> &str {
        &self.product
    }

    async fn query(&self, _sql: &str, _params: &[SqlParam]) -> StorageResult<Vec<SqlRow>> {
        Err(Self::unavailable())
    }

    async fn execute(&self, _sql: &str, _params: &[SqlParam]) -> StorageResult<u64> {
        Err(Self::unavailable())
    }

    async fn execute_batch(&self, _sql: &str) -> StorageResult<()> {
        Err(Self::unavailable())
    }

    async fn health_check(&self) -> StorageResult<()> {
        Err(Self::unavailable())
    }
}

/// Executor delegating to another one, except that the `fail_on`-th call to
/// `execute` (1-based) fails without reaching the database.
#[derive(Debug)]
pub struct FailingExecutor {
    inner: Arc<dyn SqlExecutor>,
    fail_on: usize,
    executed: AtomicUsize,
}

impl FailingExecutor {
    pub fn new(inner: Arc<dyn SqlExecutor>, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            executed: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SqlExecutor for FailingExecutor {
    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }

    fn product_name(&self) -> &str {
        self.inner.product_name()
    }

    async fn query(&self, sql: &str, params: &[SqlParam]) -> StorageResult<Vec<SqlRow>> {
        self.inner.query(sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> StorageResult<u64> {
        let n = self.executed.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_on {
            return Err(StorageError::Backend(BackendError::QueryError {
                message: format!("statement {} rejected", n),
            }));
        }
        self.inner.execute(sql, params).await
    }

    async fn execute_batch(&self, sql: &str) -> StorageResult<()> {
        self.inner.execute_batch(sql).await
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.inner.health_check().await
    }
}

/// 2024-03-`day` at `hour`:00:00.
pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .expect("valid date")
        .and_hms_opt(hour, 0, 0)
        .expect("valid time")
}

/// Sample data carrying a fixed insert timestamp.
pub fn inserted_at(ts: NaiveDateTime) -> SampleData {
    SampleData::new().with(INSERT_TIMESTAMP, ts.format(TIMESTAMP_FORMAT).to_string())
}
