//! SQLite dialect.
//!
//! `REGEXP` has no built-in implementation in SQLite; the SQLite executor
//! registers a `regexp(pattern, text)` function on every pooled connection,
//! along with `to_number(value)` for numeric comparisons.

use super::{Dialect, DialectKind, quote_with};

/// SQLite adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    fn regexp_operator(&self) -> &'static str {
        "REGEXP"
    }

    fn quote(&self, identifier: &str) -> String {
        quote_with(identifier, '"')
    }

    fn limit_clause(&self, limit: usize) -> String {
        format!("LIMIT {}", limit)
    }

    fn placeholder(&self, index: usize) -> String {
        format!("?{}", index)
    }

    fn numeric(&self, expr: &str) -> String {
        format!("to_number({})", expr)
    }
}
