//! SQL dialect adapters.
//!
//! The query compiler is dialect-agnostic; everything that differs between
//! database products goes through the narrow [`Dialect`] trait. An adapter is
//! selected once per connection from the product name the connection reports
//! (see [`dialect_for_product`]) and reused for the lifetime of the store.
//!
//! | Product | Regexp | Quote | Placeholder |
//! |---------|--------|-------|-------------|
//! | SQLite | `REGEXP` | `"x"` | `?N` |
//! | PostgreSQL | `~` | `"x"` | `$N` |
//! | MySQL / MariaDB | `REGEXP` | `` `x` `` | `?` |

use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::error::DialectError;

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

/// Identifies a supported SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    /// SQLite (file-based or in-memory).
    Sqlite,
    /// PostgreSQL.
    Postgres,
    /// MySQL and MariaDB.
    MySql,
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialectKind::Sqlite => write!(f, "sqlite"),
            DialectKind::Postgres => write!(f, "postgres"),
            DialectKind::MySql => write!(f, "mysql"),
        }
    }
}

/// Dialect-specific SQL fragments.
pub trait Dialect: Debug + Send + Sync {
    /// Which dialect this is.
    fn kind(&self) -> DialectKind;

    /// The regular-expression match operator, used as `expr <op> pattern`.
    fn regexp_operator(&self) -> &'static str;

    /// Quotes an identifier such as a table name.
    fn quote(&self, identifier: &str) -> String;

    /// The clause restricting the result to `limit` rows.
    fn limit_clause(&self, limit: usize) -> String;

    /// Bind placeholder for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String;

    /// Casts a VARCHAR expression for numeric comparison.
    ///
    /// Values that do not look like numbers must yield NULL, never an error
    /// or a default such as 0, so that a range predicate excludes them on
    /// every dialect.
    fn numeric(&self, expr: &str) -> String;
}

/// Doubles every occurrence of `quote` inside `identifier` and wraps it.
pub(crate) fn quote_with(identifier: &str, quote: char) -> String {
    let escaped = identifier.replace(quote, &format!("{quote}{quote}"));
    format!("{quote}{escaped}{quote}")
}

/// Selects the adapter for a database product name.
///
/// Matching is case-insensitive and accepts the names reported by the common
/// drivers ("SQLite", "PostgreSQL", "MySQL", "MariaDB").
pub fn dialect_for_product(product: &str) -> Result<Arc<dyn Dialect>, DialectError> {
    let name = product.to_lowercase();
    if name.contains("sqlite") {
        Ok(Arc::new(SqliteDialect))
    } else if name.contains("postgres") {
        Ok(Arc::new(PostgresDialect))
    } else if name.contains("mysql") || name.contains("mariadb") {
        Ok(Arc::new(MySqlDialect))
    } else {
        Err(DialectError::Unsupported {
            product: product.to_string(),
        })
    }
}
