//! DDL for the metadata table and the container table.
//!
//! The metadata table has one row per `(ID, NAME)`:
//!
//! | Column | Type | |
//! |--------|------|--|
//! | `ID` | `VARCHAR(255)` | container sample ID |
//! | `NAME` | `VARCHAR(255)` | field name |
//! | `TYPE` | `VARCHAR(1)` | `N`, `S` or `B` |
//! | `VALUE` | `VARCHAR(10240)` | encoded value |
//!
//! A unique index on `(ID, NAME)` turns racing inserts of the same field into
//! a constraint violation instead of a duplicate row.

use crate::dialect::{Dialect, DialectKind};

/// Statements creating the metadata table and its indexes, if absent.
pub fn metadata_table_ddl(dialect: &dyn Dialect, table: &str) -> Vec<String> {
    let quoted = dialect.quote(table);
    let idx = |suffix: &str| dialect.quote(&format!("idx_{table}_{suffix}"));

    match dialect.kind() {
        DialectKind::MySql => vec![format!(
            "CREATE TABLE IF NOT EXISTS {quoted} (
                ID VARCHAR(255) NOT NULL,
                NAME VARCHAR(255) NOT NULL,
                TYPE VARCHAR(1),
                VALUE VARCHAR(10240),
                INDEX {} (ID),
                INDEX {} (NAME),
                UNIQUE INDEX {} (ID, NAME)
            )",
            idx("id"),
            idx("name"),
            idx("id_name"),
        )],
        DialectKind::Sqlite | DialectKind::Postgres => vec![
            format!(
                "CREATE TABLE IF NOT EXISTS {quoted} (
                    ID VARCHAR(255) NOT NULL,
                    NAME VARCHAR(255) NOT NULL,
                    TYPE VARCHAR(1),
                    VALUE VARCHAR(10240)
                )"
            ),
            format!("CREATE INDEX IF NOT EXISTS {} ON {quoted} (ID)", idx("id")),
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {quoted} (NAME)",
                idx("name")
            ),
            format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {quoted} (ID, NAME)",
                idx("id_name")
            ),
        ],
    }
}

/// Statements creating a minimal container table, if absent.
pub fn container_table_ddl(dialect: &dyn Dialect, table: &str) -> Vec<String> {
    let quoted = dialect.quote(table);
    let idx = dialect.quote(&format!("idx_{table}_sampleid"));

    match dialect.kind() {
        DialectKind::Sqlite => vec![
            format!(
                "CREATE TABLE IF NOT EXISTS {quoted} (
                    AUTO_ID INTEGER PRIMARY KEY AUTOINCREMENT,
                    SAMPLEID VARCHAR(255) NOT NULL,
                    FORMAT VARCHAR(255)
                )"
            ),
            format!("CREATE INDEX IF NOT EXISTS {idx} ON {quoted} (SAMPLEID)"),
        ],
        DialectKind::Postgres => vec![
            format!(
                "CREATE TABLE IF NOT EXISTS {quoted} (
                    AUTO_ID BIGSERIAL PRIMARY KEY,
                    SAMPLEID VARCHAR(255) NOT NULL,
                    FORMAT VARCHAR(255)
                )"
            ),
            format!("CREATE INDEX IF NOT EXISTS {idx} ON {quoted} (SAMPLEID)"),
        ],
        DialectKind::MySql => vec![format!(
            "CREATE TABLE IF NOT EXISTS {quoted} (
                AUTO_ID BIGINT AUTO_INCREMENT PRIMARY KEY,
                SAMPLEID VARCHAR(255) NOT NULL,
                FORMAT VARCHAR(255),
                INDEX {idx} (SAMPLEID)
            )"
        )],
    }
}
