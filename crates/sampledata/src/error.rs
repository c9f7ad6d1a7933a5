//! Error types for the sample-data store.
//!
//! Errors are grouped by category: backend (connectivity and execution),
//! dialect selection, write concurrency, and value decoding. Read operations
//! on the store degrade to empty results and write operations report a plain
//! success flag, so most of these errors surface in logs rather than to the
//! caller. The structured forms are available through the `try_*` variants.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all store operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Dialect selection errors
    #[error(transparent)]
    Dialect(#[from] DialectError),

    /// Concurrent write errors
    #[error(transparent)]
    Concurrency(#[from] ConcurrencyError),

    /// Stored value decoding errors
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Sample data cannot be attached to an empty container ID.
    #[error("container id must not be empty")]
    EmptyContainerId,
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Connection pool exhausted.
    #[error("connection pool exhausted for {backend_name}")]
    PoolExhausted { backend_name: String },

    /// Schema creation error.
    #[error("schema initialization failed: {message}")]
    SchemaError { message: String },

    /// A unique constraint rejected the statement.
    #[error("unique constraint violated in {backend_name}: {message}")]
    UniqueViolation {
        backend_name: String,
        message: String,
    },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// The connection URL could not be understood.
    #[error("invalid connection url '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// Errors related to SQL dialect selection.
#[derive(Error, Debug)]
pub enum DialectError {
    /// No adapter exists for the connection's database product.
    #[error("unsupported database product: {product}")]
    Unsupported { product: String },
}

/// Errors related to concurrent writers.
#[derive(Error, Debug)]
pub enum ConcurrencyError {
    /// Another writer inserted the same `(ID, NAME)` row first.
    ///
    /// Retrying is up to the caller; the store never retries.
    #[error("write conflict on {container_id}/{field}")]
    WriteConflict { container_id: String, field: String },
}

/// Errors raised while decoding a stored value back into its declared type.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The value is tagged numeric but does not parse as a number.
    #[error("field '{field}': '{value}' is not a number")]
    InvalidNumber { field: String, value: String },

    /// The value is tagged boolean but is neither `true` nor `false`.
    #[error("field '{field}': '{value}' is not a boolean")]
    InvalidBoolean { field: String, value: String },

    /// The type column holds an unknown tag.
    #[error("field '{field}': unknown type tag '{tag}'")]
    UnknownTypeTag { field: String, tag: String },
}

/// Result type alias for store operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref code, ref message) = err {
            if code.code == rusqlite::ErrorCode::ConstraintViolation {
                return StorageError::Backend(BackendError::UniqueViolation {
                    backend_name: "sqlite".to_string(),
                    message: message.clone().unwrap_or_else(|| code.to_string()),
                });
            }
        }
        StorageError::Backend(BackendError::Internal {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for StorageError {
    fn from(_err: r2d2::Error) -> Self {
        StorageError::Backend(BackendError::PoolExhausted {
            backend_name: "sqlite".to_string(),
        })
    }
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for StorageError {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.code() == Some(&tokio_postgres::error::SqlState::UNIQUE_VIOLATION) {
            return StorageError::Backend(BackendError::UniqueViolation {
                backend_name: "postgres".to_string(),
                message: err.to_string(),
            });
        }
        StorageError::Backend(BackendError::Internal {
            backend_name: "postgres".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}

impl StorageError {
    /// Returns true if the error came from a unique constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Backend(BackendError::UniqueViolation { .. })
                | StorageError::Concurrency(ConcurrencyError::WriteConflict { .. })
        )
    }
}
