//! Statement parameter values.
//!
//! Arguments bind positionally (1..N in slice order) and are restricted to
//! a fixed set of kinds; anything outside the set simply cannot be
//! constructed, so there is no runtime "unsupported type" path.

use chrono::NaiveDate;
use rusqlite::types::ToSqlOutput;
use rusqlite::ToSql;

/// A bindable statement argument.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i32),
    Long(i64),
    Bool(bool),
    Date(NaiveDate),
    Text(String),
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlValue::Integer(value) => value.to_sql(),
            SqlValue::Long(value) => value.to_sql(),
            SqlValue::Bool(value) => value.to_sql(),
            SqlValue::Date(value) => value.to_sql(),
            SqlValue::Text(value) => value.to_sql(),
        }
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Long(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(value: NaiveDate) -> Self {
        SqlValue::Date(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

/// Builds a `&[SqlValue]` argument slice from plain Rust values.
///
/// ```
/// use sqlmid::sql_values;
///
/// let args = sql_values![1, "Jon Snow"];
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! sql_values {
    () => {
        &[] as &[$crate::db::params::SqlValue]
    };
    ($($value:expr),+ $(,)?) => {
        &[$($crate::db::params::SqlValue::from($value)),+]
    };
}
