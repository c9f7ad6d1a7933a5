//! MySQL / MariaDB dialect.
//!
//! No MySQL driver ships with this crate; callers that hold a MySQL
//! connection provide their own [`SqlExecutor`](crate::core::SqlExecutor)
//! reporting the product name "MySQL" and get this adapter.

use super::{Dialect, DialectKind, quote_with};

/// Pattern a value must match before it is cast to a number.
///
/// POSIX classes only; backslashes are string escapes in MySQL literals.
const NUMERIC_PATTERN: &str =
    "'^[[:space:]]*[-+]?([0-9]+[.]?[0-9]*|[.][0-9]+)([eE][-+]?[0-9]+)?[[:space:]]*$'";

/// MySQL adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::MySql
    }

    fn regexp_operator(&self) -> &'static str {
        "REGEXP"
    }

    fn quote(&self, identifier: &str) -> String {
        quote_with(identifier, '`')
    }

    fn limit_clause(&self, limit: usize) -> String {
        format!("LIMIT {}", limit)
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn numeric(&self, expr: &str) -> String {
        // A bare CAST turns text into 0
        format!(
            "(CASE WHEN {expr} REGEXP {NUMERIC_PATTERN} THEN CAST({expr} AS DECIMAL(65,10)) END)"
        )
    }
}
