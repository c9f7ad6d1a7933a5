//! Scalar functions registered on every SQLite connection.

use std::sync::Arc;

use regex::Regex;
use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Registers `regexp(pattern, text)`, which backs the `REGEXP` operator.
///
/// The compiled pattern is cached per statement. NULL text never matches.
pub(crate) fn register_regexp(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let regex: Arc<Regex> = ctx.get_or_create_aux(0, |pattern| -> Result<_, BoxError> {
                Ok(Regex::new(pattern.as_str()?)?)
            })?;
            let matched = match ctx.get_raw(1) {
                ValueRef::Null => false,
                ValueRef::Text(text) | ValueRef::Blob(text) => {
                    regex.is_match(&String::from_utf8_lossy(text))
                }
                ValueRef::Integer(i) => regex.is_match(&i.to_string()),
                ValueRef::Real(f) => regex.is_match(&f.to_string()),
            };
            Ok(matched)
        },
    )
}

/// Registers `to_number(value)`, the numeric view of a stored value.
///
/// Text that does not parse as a finite number yields NULL, so comparisons
/// against it are never true.
pub(crate) fn register_to_number(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "to_number",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let number = match ctx.get_raw(0) {
                ValueRef::Null | ValueRef::Blob(_) => None,
                ValueRef::Integer(i) => Some(i as f64),
                ValueRef::Real(f) => Some(f),
                ValueRef::Text(text) => std::str::from_utf8(text)
                    .ok()
                    .and_then(|s| s.trim().parse::<f64>().ok())
                    .filter(|n| n.is_finite()),
            };
            Ok(number)
        },
    )
}
