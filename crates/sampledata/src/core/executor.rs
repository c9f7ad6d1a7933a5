//! SQL execution abstraction.
//!
//! The store never talks to a driver directly. It hands parameterized SQL to a
//! [`SqlExecutor`], which owns the connection pool and converts driver values
//! to and from [`SqlParam`] / [`SqlValue`]. The executor also reports the
//! database product name used to pick the SQL dialect.

use std::fmt::{self, Debug};

use async_trait::async_trait;

use crate::error::StorageResult;

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// String parameter.
    String(String),
    /// Integer parameter.
    Integer(i64),
    /// Float parameter.
    Float(f64),
    /// Null parameter.
    Null,
}

impl SqlParam {
    /// Creates a string parameter.
    pub fn string(s: impl Into<String>) -> Self {
        SqlParam::String(s.into())
    }

    /// Creates an integer parameter.
    pub fn integer(i: i64) -> Self {
        SqlParam::Integer(i)
    }

    /// Creates a float parameter.
    pub fn float(f: f64) -> Self {
        SqlParam::Float(f)
    }
}

/// A single cell of a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// Integer column.
    Integer(i64),
    /// Floating point column.
    Real(f64),
    /// Text column.
    Text(String),
}

impl SqlValue {
    /// The cell as text; NULL becomes the empty string.
    pub fn as_text(&self) -> String {
        match self {
            SqlValue::Null => String::new(),
            SqlValue::Integer(i) => i.to_string(),
            SqlValue::Real(f) => f.to_string(),
            SqlValue::Text(s) => s.clone(),
        }
    }

    /// The cell as an integer, parsing text if necessary.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            SqlValue::Real(f) => Some(*f as i64),
            SqlValue::Text(s) => s.trim().parse().ok(),
            SqlValue::Null => None,
        }
    }

    /// Returns true for SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

/// One result row.
pub type SqlRow = Vec<SqlValue>;

/// Executes SQL against one database.
///
/// Implementations hold their own connection pool. Each call is a single
/// round trip; results are fully materialized before returning.
#[async_trait]
pub trait SqlExecutor: Debug + Send + Sync {
    /// Short backend name used in errors and logs.
    fn backend_name(&self) -> &'static str;

    /// The database product name, e.g. "SQLite" or "PostgreSQL".
    fn product_name(&self) -> &str;

    /// Runs a query and returns all rows.
    async fn query(&self, sql: &str, params: &[SqlParam]) -> StorageResult<Vec<SqlRow>>;

    /// Runs a statement and returns the number of affected rows.
    async fn execute(&self, sql: &str, params: &[SqlParam]) -> StorageResult<u64>;

    /// Runs one or more parameterless statements, e.g. DDL.
    async fn execute_batch(&self, sql: &str) -> StorageResult<()>;

    /// Verifies that a connection can be obtained and used.
    async fn health_check(&self) -> StorageResult<()>;
}
