//! Typed access to one fetched row.

use crate::error::{DbError, Result};
use chrono::NaiveDate;
use rusqlite::types::FromSql;
use rusqlite::Row;

/// A view over a single fetched row, handed to row-mapper callbacks.
///
/// Each `get_*` accessor returns `Ok(None)` when the stored value is SQL
/// NULL or when the column is absent from the row shape; the two cases are
/// deliberately not distinguished. The `require_*` accessors turn `None`
/// into `DbError::RequiredColumnMissing`. Decoding never falls back to a
/// zero default: a NULL integer reads as `None`, not `0`.
pub struct ResultRow<'a> {
    row: &'a Row<'a>,
}

impl<'a> ResultRow<'a> {
    pub(crate) fn new(row: &'a Row<'a>) -> Self {
        ResultRow { row }
    }

    pub fn get_string(&self, column: &str) -> Result<Option<String>> {
        self.get(column)
    }

    pub fn require_string(&self, column: &str) -> Result<String> {
        self.require(column)
    }

    pub fn get_integer(&self, column: &str) -> Result<Option<i32>> {
        self.get(column)
    }

    pub fn require_integer(&self, column: &str) -> Result<i32> {
        self.require(column)
    }

    pub fn get_long(&self, column: &str) -> Result<Option<i64>> {
        self.get(column)
    }

    pub fn require_long(&self, column: &str) -> Result<i64> {
        self.require(column)
    }

    pub fn get_boolean(&self, column: &str) -> Result<Option<bool>> {
        self.get(column)
    }

    pub fn require_boolean(&self, column: &str) -> Result<bool> {
        self.require(column)
    }

    pub fn get_date(&self, column: &str) -> Result<Option<NaiveDate>> {
        self.get(column)
    }

    pub fn require_date(&self, column: &str) -> Result<NaiveDate> {
        self.require(column)
    }

    fn get<T: FromSql>(&self, column: &str) -> Result<Option<T>> {
        match self.row.get::<_, Option<T>>(column) {
            Ok(value) => Ok(value),
            Err(rusqlite::Error::InvalidColumnName(_)) => Ok(None),
            Err(err) => Err(DbError::from(err)),
        }
    }

    fn require<T: FromSql>(&self, column: &str) -> Result<T> {
        self.get(column)?
            .ok_or_else(|| DbError::RequiredColumnMissing(column.to_string()))
    }
}
