//! Pooled PostgreSQL executor.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Config, Object, Pool, Runtime, SslMode};
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{NoTls, Row};

use crate::core::{SqlExecutor, SqlParam, SqlRow, SqlValue};
use crate::error::{BackendError, StorageError, StorageResult};

use super::config::{PostgresConfig, PostgresSslMode};

/// Executes SQL against a pooled PostgreSQL database.
pub struct PostgresExecutor {
    pool: Pool,
    config: PostgresConfig,
}

impl Debug for PostgresExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresExecutor")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("dbname", &self.config.dbname)
            .finish_non_exhaustive()
    }
}

impl PostgresExecutor {
    /// Creates an executor and verifies connectivity.
    pub async fn new(config: PostgresConfig) -> StorageResult<Self> {
        let pool = Self::create_pool(&config)?;

        let executor = Self { pool, config };
        executor.get_client().await?;

        tracing::debug!(
            host = %executor.config.host,
            dbname = %executor.config.dbname,
            "Connected to PostgreSQL"
        );
        Ok(executor)
    }

    /// Creates an executor from a `postgres://` connection string.
    pub async fn from_connection_string(url: &str) -> StorageResult<Self> {
        let config = PostgresConfig::parse_connection_string(url)?;
        Self::new(config).await
    }

    /// Creates an executor from `SAMPLEDATA_PG_*` environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        Self::new(PostgresConfig::from_env()).await
    }

    /// Returns the executor configuration.
    pub fn config(&self) -> &PostgresConfig {
        &self.config
    }

    fn create_pool(config: &PostgresConfig) -> StorageResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.dbname = Some(config.dbname.clone());
        cfg.user = Some(config.user.clone());
        cfg.password = config.password.clone();
        cfg.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
        cfg.options = Some(format!(
            "-c statement_timeout={}",
            config.statement_timeout_ms
        ));
        cfg.ssl_mode = Some(match config.ssl_mode {
            PostgresSslMode::Disable => SslMode::Disable,
            PostgresSslMode::Prefer => SslMode::Prefer,
            PostgresSslMode::Require => SslMode::Require,
        });

        cfg.builder(NoTls)
            .map_err(|e| {
                StorageError::Backend(BackendError::Internal {
                    backend_name: "postgres".to_string(),
                    message: format!("Failed to create pool builder: {}", e),
                    source: None,
                })
            })?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| {
                StorageError::Backend(BackendError::ConnectionFailed {
                    backend_name: "postgres".to_string(),
                    message: e.to_string(),
                })
            })
    }

    async fn get_client(&self) -> StorageResult<Object> {
        self.pool.get().await.map_err(|e| {
            StorageError::Backend(BackendError::ConnectionFailed {
                backend_name: "postgres".to_string(),
                message: e.to_string(),
            })
        })
    }
}

fn to_pg_params(params: &[SqlParam]) -> Vec<Box<dyn ToSql + Sync + Send>> {
    params
        .iter()
        .map(|p| -> Box<dyn ToSql + Sync + Send> {
            match p {
                SqlParam::String(s) => Box::new(s.clone()),
                SqlParam::Integer(i) => Box::new(*i),
                SqlParam::Float(f) => Box::new(*f),
                SqlParam::Null => Box::new(Option::<String>::None),
            }
        })
        .collect()
}

fn row_values(row: &Row) -> StorageResult<SqlRow> {
    let mut values = Vec::with_capacity(row.len());
    for (i, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let value = if *ty == Type::INT8 {
            row.try_get::<_, Option<i64>>(i)?.map(SqlValue::Integer)
        } else if *ty == Type::INT4 {
            row.try_get::<_, Option<i32>>(i)?
                .map(|v| SqlValue::Integer(v as i64))
        } else if *ty == Type::INT2 {
            row.try_get::<_, Option<i16>>(i)?
                .map(|v| SqlValue::Integer(v as i64))
        } else if *ty == Type::FLOAT8 {
            row.try_get::<_, Option<f64>>(i)?.map(SqlValue::Real)
        } else if *ty == Type::FLOAT4 {
            row.try_get::<_, Option<f32>>(i)?
                .map(|v| SqlValue::Real(v as f64))
        } else if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(i)?
                .map(|v| SqlValue::Integer(v as i64))
        } else {
            // TEXT, VARCHAR, BPCHAR and NAME all decode as strings
            row.try_get::<_, Option<String>>(i)?.map(SqlValue::Text)
        };
        values.push(value.unwrap_or(SqlValue::Null));
    }
    Ok(values)
}

#[async_trait]
impl SqlExecutor for PostgresExecutor {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    fn product_name(&self) -> &str {
        "PostgreSQL"
    }

    async fn query(&self, sql: &str, params: &[SqlParam]) -> StorageResult<Vec<SqlRow>> {
        let client = self.get_client().await?;
        let boxed = to_pg_params(params);
        let param_refs: Vec<&(dyn ToSql + Sync)> = boxed
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let rows = client.query(sql, &param_refs).await?;
        rows.iter().map(row_values).collect()
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> StorageResult<u64> {
        let client = self.get_client().await?;
        let boxed = to_pg_params(params);
        let param_refs: Vec<&(dyn ToSql + Sync)> = boxed
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();

        Ok(client.execute(sql, &param_refs).await?)
    }

    async fn execute_batch(&self, sql: &str) -> StorageResult<()> {
        let client = self.get_client().await?;
        client.batch_execute(sql).await.map_err(|e| {
            StorageError::Backend(BackendError::SchemaError {
                message: e.to_string(),
            })
        })
    }

    async fn health_check(&self) -> StorageResult<()> {
        let client = self.get_client().await.map_err(|_| {
            StorageError::Backend(BackendError::Unavailable {
                backend_name: "postgres".to_string(),
                message: "Failed to get connection".to_string(),
            })
        })?;
        client.query_one("SELECT 1", &[]).await.map_err(|e| {
            StorageError::Backend(BackendError::Internal {
                backend_name: "postgres".to_string(),
                message: format!("Health check failed: {}", e),
                source: None,
            })
        })?;
        Ok(())
    }
}
