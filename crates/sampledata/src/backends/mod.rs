//! Database executors.
//!
//! Each executor owns a connection pool and implements
//! [`SqlExecutor`](crate::core::SqlExecutor). Each is gated behind a feature
//! flag.
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | SQLite | `sqlite` | Embedded database, in-memory or file based |
//! | PostgreSQL | `postgres` | Client/server RDBMS via `tokio-postgres` |
//!
//! MySQL and MariaDB have a dialect adapter but no bundled executor; supply
//! your own [`SqlExecutor`](crate::core::SqlExecutor) reporting a "MySQL" or
//! "MariaDB" product name.

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;
