//! Pooled SQLite executor.

use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{ToSql, params_from_iter};
use serde::{Deserialize, Serialize};

use crate::core::{SqlExecutor, SqlParam, SqlRow, SqlValue};
use crate::error::{BackendError, StorageError, StorageResult};

use super::functions;

/// Configuration for the SQLite executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Maximum number of connections in the pool.
    ///
    /// Always 1 for in-memory databases, where every connection would
    /// otherwise open its own empty database.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of idle connections.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,

    /// Enable WAL mode for file databases.
    #[serde(default = "default_true")]
    pub enable_wal: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout_ms() -> u64 {
    30000
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_ms: default_connection_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            enable_wal: true,
        }
    }
}

/// Executes SQL against a pooled SQLite database.
pub struct SqliteExecutor {
    pool: Pool<SqliteConnectionManager>,
    config: SqliteConfig,
    is_memory: bool,
}

impl Debug for SqliteExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteExecutor")
            .field("config", &self.config)
            .field("is_memory", &self.is_memory)
            .finish_non_exhaustive()
    }
}

impl SqliteExecutor {
    /// Creates an executor over a new in-memory database.
    pub fn in_memory() -> StorageResult<Self> {
        Self::with_config(":memory:", SqliteConfig::default())
    }

    /// Opens or creates a file-based database.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        Self::with_config(path, SqliteConfig::default())
    }

    /// Creates an executor with custom configuration.
    pub fn with_config<P: AsRef<Path>>(path: P, mut config: SqliteConfig) -> StorageResult<Self> {
        let is_memory = path.as_ref().to_string_lossy() == ":memory:";
        if is_memory {
            config.max_connections = 1;
            config.min_connections = 1;
        }

        let busy_timeout = Duration::from_millis(config.busy_timeout_ms as u64);
        let enable_wal = config.enable_wal && !is_memory;
        let manager = if is_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path.as_ref())
        }
        .with_init(move |conn| {
            functions::register_regexp(conn)?;
            functions::register_to_number(conn)?;
            conn.busy_timeout(busy_timeout)?;
            if enable_wal {
                conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
            }
            Ok(())
        });

        let mut builder = Pool::builder()
            .max_size(config.max_connections)
            .min_idle(Some(config.min_connections))
            .connection_timeout(Duration::from_millis(config.connection_timeout_ms));
        if is_memory {
            // Dropping the only connection would drop the database
            builder = builder.idle_timeout(None).max_lifetime(None);
        }
        let pool = builder.build(manager).map_err(|e| {
            StorageError::Backend(BackendError::ConnectionFailed {
                backend_name: "sqlite".to_string(),
                message: e.to_string(),
            })
        })?;

        tracing::debug!(
            is_memory,
            max_connections = config.max_connections,
            "Opened SQLite pool"
        );

        Ok(Self {
            pool,
            config,
            is_memory,
        })
    }

    /// Returns whether this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Returns the executor configuration.
    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    fn get_connection(&self) -> StorageResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlParam::String(s) => ToSqlOutput::from(s.as_str()),
            SqlParam::Integer(i) => ToSqlOutput::from(*i),
            SqlParam::Float(f) => ToSqlOutput::from(*f),
            SqlParam::Null => ToSqlOutput::Owned(Value::Null),
        })
    }
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(i) => SqlValue::Integer(i),
            ValueRef::Real(f) => SqlValue::Real(f),
            ValueRef::Text(t) | ValueRef::Blob(t) => {
                SqlValue::Text(String::from_utf8_lossy(t).into_owned())
            }
        }
    }
}

#[async_trait]
impl SqlExecutor for SqliteExecutor {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn product_name(&self) -> &str {
        "SQLite"
    }

    async fn query(&self, sql: &str, params: &[SqlParam]) -> StorageResult<Vec<SqlRow>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(sql)?;
        let column_count = stmt.column_count();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(SqlValue::from(row.get_ref(i)?));
            }
            result.push(values);
        }
        Ok(result)
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> StorageResult<u64> {
        let conn = self.get_connection()?;
        let affected = conn.execute(sql, params_from_iter(params.iter()))?;
        Ok(affected as u64)
    }

    async fn execute_batch(&self, sql: &str) -> StorageResult<()> {
        let conn = self.get_connection()?;
        conn.execute_batch(sql).map_err(|e| {
            StorageError::Backend(BackendError::SchemaError {
                message: e.to_string(),
            })
        })
    }

    async fn health_check(&self) -> StorageResult<()> {
        let conn = self.get_connection().map_err(|_| {
            StorageError::Backend(BackendError::Unavailable {
                backend_name: "sqlite".to_string(),
                message: "Failed to get connection".to_string(),
            })
        })?;
        conn.query_row("SELECT 1", [], |_| Ok(())).map_err(|e| {
            StorageError::Backend(BackendError::Internal {
                backend_name: "sqlite".to_string(),
                message: format!("Health check failed: {}", e),
                source: None,
            })
        })
    }
}
