//! PostgreSQL dialect.

use super::{Dialect, DialectKind, quote_with};

/// Pattern a value must match before it is cast to a number.
const NUMERIC_PATTERN: &str = r"'^\s*[-+]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][-+]?[0-9]+)?\s*$'";

/// PostgreSQL adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    fn regexp_operator(&self) -> &'static str {
        "~"
    }

    fn quote(&self, identifier: &str) -> String {
        quote_with(identifier, '"')
    }

    fn limit_clause(&self, limit: usize) -> String {
        format!("LIMIT {}", limit)
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn numeric(&self, expr: &str) -> String {
        // A failed cast aborts the whole statement in PostgreSQL
        format!(
            "(CASE WHEN {expr} ~ {NUMERIC_PATTERN} THEN CAST({expr} AS DOUBLE PRECISION) END)"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_fragments() {
        let d = PostgresDialect;
        assert_eq!(d.regexp_operator(), "~");
        assert_eq!(d.quote("spectrum"), "\"spectrum\"");
        assert_eq!(d.limit_clause(10), "LIMIT 10");
        assert_eq!(d.placeholder(1), "$1");
    }

    #[test]
    fn test_postgres_numeric_is_guarded() {
        let sql = PostgresDialect.numeric("sd0.VALUE");
        assert!(sql.starts_with("(CASE WHEN sd0.VALUE ~"));
        assert!(sql.contains("CAST(sd0.VALUE AS DOUBLE PRECISION)"));
    }
}
