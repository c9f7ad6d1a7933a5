//! Compiles [`SampleDataConditions`] into one parameterized SQL statement.
//!
//! The metadata table holds one row per `(ID, NAME)`, so every predicate on a
//! field needs its own instance of the table. The compiler allocates one alias
//! per active predicate:
//!
//! | Alias | Predicate |
//! |-------|-----------|
//! | `sd` | base row, anchored on the insert timestamp |
//! | `sp` | the container table |
//! | `sd{i}` | numeric range `i` |
//! | `sd_start` / `sd_end` | insert-timestamp bounds |
//! | `sd_instrument` | instrument regexp |
//! | `sd_sampletype` | sample-type regexp |
//! | `sd_dummies` | dummy flag |
//! | `sd_req{i}` | required field `i` |
//! | `sd_sort_by_date` | ordering, always present |
//!
//! Each alias contributes `alias.ID = sp.SAMPLEID AND alias.NAME = ?` followed
//! by its value predicate. Every literal is bound as a parameter, and
//! parameters are numbered in the order they appear in the statement so the
//! positional `?` of MySQL works as well as `?N` and `$N`.

use serde::{Deserialize, Serialize};

use crate::core::SqlParam;
use crate::dialect::Dialect;
use crate::types::{DUMMY_REPORT, INSERT_TIMESTAMP, INSTRUMENT, SAMPLE_TYPE, TIMESTAMP_FORMAT};

use super::conditions::SampleDataConditions;

const BASE_ALIAS: &str = "sd";
const CONTAINER_ALIAS: &str = "sp";
const SORT_ALIAS: &str = "sd_sort_by_date";

/// A column of the query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputColumn {
    /// The container's sample ID (`sp.SAMPLEID`).
    SampleId,
    /// The container's internal numeric ID (`sp.AUTO_ID`).
    DatabaseId,
    /// The container's format (`sp.FORMAT`).
    Format,
    /// The stored insert timestamp (`sd.VALUE`).
    InsertTimestamp,
}

impl OutputColumn {
    /// The SQL expression selecting this column.
    pub fn expression(&self) -> &'static str {
        match self {
            OutputColumn::SampleId => "sp.SAMPLEID",
            OutputColumn::DatabaseId => "sp.AUTO_ID",
            OutputColumn::Format => "sp.FORMAT",
            OutputColumn::InsertTimestamp => "sd.VALUE",
        }
    }

    /// Parses a column expression such as `sp.SAMPLEID`.
    pub fn from_expression(expr: &str) -> Option<Self> {
        match expr.trim().to_uppercase().as_str() {
            "SP.SAMPLEID" | "SAMPLEID" => Some(OutputColumn::SampleId),
            "SP.AUTO_ID" | "AUTO_ID" => Some(OutputColumn::DatabaseId),
            "SP.FORMAT" | "FORMAT" => Some(OutputColumn::Format),
            "SD.VALUE" => Some(OutputColumn::InsertTimestamp),
            _ => None,
        }
    }
}

/// A compiled statement and its parameters, in binding order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// The SQL text.
    pub sql: String,
    /// Bound parameter values.
    pub params: Vec<SqlParam>,
}

/// Accumulates aliases, predicates and parameters while compiling.
struct QueryParts<'a> {
    dialect: &'a dyn Dialect,
    aliases: Vec<String>,
    predicates: Vec<String>,
    params: Vec<SqlParam>,
}

impl<'a> QueryParts<'a> {
    fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            dialect,
            aliases: Vec::new(),
            predicates: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Adds a parameter and returns its placeholder.
    fn bind(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        self.dialect.placeholder(self.params.len())
    }

    /// Allocates an alias joined to the container on the given field name.
    fn join_field(&mut self, alias: &str, field_name: &str) {
        self.aliases.push(alias.to_string());
        self.join_existing(alias, field_name);
    }

    fn join_existing(&mut self, alias: &str, field_name: &str) {
        let name = self.bind(SqlParam::string(field_name));
        self.predicates.push(format!("{alias}.ID = {CONTAINER_ALIAS}.SAMPLEID"));
        self.predicates.push(format!("{alias}.NAME = {name}"));
    }

    fn regexp(&mut self, expr: &str, pattern: &str) {
        let ph = self.bind(SqlParam::string(pattern));
        let op = self.dialect.regexp_operator();
        self.predicates.push(format!("{expr} {op} {ph}"));
    }

    fn compare(&mut self, expr: &str, op: &str, param: SqlParam) {
        let ph = self.bind(param);
        self.predicates.push(format!("{expr} {op} {ph}"));
    }
}

/// Translates conditions into SQL for one dialect and pair of tables.
#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler<'a> {
    dialect: &'a dyn Dialect,
    table: &'a str,
    container_table: &'a str,
}

impl<'a> QueryCompiler<'a> {
    /// Creates a compiler over the metadata table and the container table.
    pub fn new(dialect: &'a dyn Dialect, table: &'a str, container_table: &'a str) -> Self {
        Self {
            dialect,
            table,
            container_table,
        }
    }

    /// Compiles the conditions, projecting `columns` in the given order.
    ///
    /// An empty column list selects the sample ID. The conditions are
    /// compiled as given; call [`SampleDataConditions::check`] first to
    /// normalize them.
    pub fn compile(
        &self,
        columns: &[OutputColumn],
        conditions: &SampleDataConditions,
    ) -> CompiledQuery {
        let mut parts = QueryParts::new(self.dialect);

        for (i, range) in conditions.field_ranges().into_iter().enumerate() {
            if !range.is_active() {
                continue;
            }
            let alias = format!("sd{i}");
            parts.join_field(&alias, range.field.name());
            let value = self.dialect.numeric(&format!("{alias}.VALUE"));
            if let Some(min) = range.min {
                parts.compare(&value, ">=", SqlParam::float(min));
            }
            if let Some(max) = range.max {
                parts.compare(&value, "<=", SqlParam::float(max));
            }
        }

        if let Some(regexp) = conditions.sample_id_regexp() {
            parts.regexp("sp.SAMPLEID", regexp);
        }
        if let Some(regexp) = conditions.format_regexp() {
            parts.regexp("sp.FORMAT", regexp);
        }

        if let Some(start) = conditions.start_date() {
            parts.join_field("sd_start", INSERT_TIMESTAMP);
            let bound = start.format(TIMESTAMP_FORMAT).to_string();
            parts.compare("sd_start.VALUE", ">=", SqlParam::string(bound));
        }
        if let Some(end) = conditions.end_date() {
            parts.join_field("sd_end", INSERT_TIMESTAMP);
            let bound = end.format(TIMESTAMP_FORMAT).to_string();
            parts.compare("sd_end.VALUE", "<=", SqlParam::string(bound));
        }

        if let Some(regexp) = conditions.instrument_regexp() {
            parts.join_field("sd_instrument", INSTRUMENT);
            parts.regexp("sd_instrument.VALUE", regexp);
        }
        if let Some(regexp) = conditions.sample_type_regexp() {
            parts.join_field("sd_sampletype", SAMPLE_TYPE);
            parts.regexp("sd_sampletype.VALUE", regexp);
        }

        if conditions.exclude_dummies() || conditions.only_dummies() {
            parts.join_field("sd_dummies", DUMMY_REPORT);
            let flag = conditions.only_dummies().to_string();
            parts.compare("sd_dummies.VALUE", "=", SqlParam::string(flag));
        }

        for (i, field) in conditions.required_fields().into_iter().enumerate() {
            if field.is_empty() {
                continue;
            }
            parts.join_field(&format!("sd_req{i}"), field.name());
        }

        parts.join_existing(BASE_ALIAS, INSERT_TIMESTAMP);
        parts.join_field(SORT_ALIAS, INSERT_TIMESTAMP);

        let projection = if columns.is_empty() {
            OutputColumn::SampleId.expression().to_string()
        } else {
            columns
                .iter()
                .map(OutputColumn::expression)
                .collect::<Vec<_>>()
                .join(", ")
        };

        let table = self.dialect.quote(self.table);
        let mut tables = vec![
            format!("{table} {BASE_ALIAS}"),
            format!(
                "{} {CONTAINER_ALIAS}",
                self.dialect.quote(self.container_table)
            ),
        ];
        tables.extend(parts.aliases.iter().map(|alias| format!("{table} {alias}")));

        let direction = if conditions.latest() { "DESC" } else { "ASC" };
        let mut sql = format!(
            "SELECT {projection} FROM {} WHERE {} ORDER BY {SORT_ALIAS}.VALUE {direction}",
            tables.join(", "),
            parts.predicates.join(" AND "),
        );
        if conditions.limit() > 0 {
            sql.push(' ');
            sql.push_str(&self.dialect.limit_clause(conditions.limit()));
        }

        CompiledQuery {
            sql,
            params: parts.params,
        }
    }
}
