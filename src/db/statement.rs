//! Statement Execution Module
//!
//! Turns a SQL string plus positional arguments into a bound statement,
//! executes it on a connection resolved by the session, and maps rows or
//! affected-row counts. Row-count invariants (`insert` must insert,
//! `*_single` must hit exactly one row) are enforced here, after the
//! statement has executed cleanly.

use crate::db::connection::{ConnectionSource, DbSession};
use crate::db::params::SqlValue;
use crate::db::row::ResultRow;
use crate::error::{DbError, Result};
use rusqlite::{Connection, Statement};
use tracing::debug;

impl<S: ConnectionSource> DbSession<S> {
    /// Executes a query and maps its first row, if any.
    ///
    /// Returns `Ok(None)` when the cursor is empty; this is the only
    /// "not found" signal a query has.
    pub fn query_for_single<T, F>(&self, sql: &str, params: &[SqlValue], mapper: F) -> Result<Option<T>>
    where
        F: FnMut(&ResultRow<'_>) -> Result<T>,
    {
        self.with_connection(|conn| query_single(conn, sql, params, mapper))
    }

    /// Executes a query and eagerly maps every row, in cursor order.
    ///
    /// An empty result is an empty vec, never an error.
    pub fn query_for_list<T, F>(&self, sql: &str, params: &[SqlValue], mapper: F) -> Result<Vec<T>>
    where
        F: FnMut(&ResultRow<'_>) -> Result<T>,
    {
        self.with_connection(|conn| query_list(conn, sql, params, mapper))
    }

    /// Executes an insert and returns the affected-row count.
    ///
    /// Fails with `NoRowsAffected` when nothing was inserted.
    pub fn insert(&self, sql: &str, params: &[SqlValue]) -> Result<usize> {
        self.with_connection(|conn| {
            let affected = execute(conn, sql, params)?;
            if affected == 0 {
                return Err(DbError::NoRowsAffected);
            }
            Ok(affected)
        })
    }

    /// Executes an insert and returns the generated key from `key_column`.
    ///
    /// Multi-row inserts return the key of the first inserted row. An
    /// unknown key column fails statement preparation and therefore
    /// surfaces as `MalformedSql`.
    pub fn insert_and_return_key(&self, sql: &str, key_column: &str, params: &[SqlValue]) -> Result<i64> {
        self.with_connection(|conn| insert_returning_key(conn, sql, key_column, params))
    }

    /// Executes an update and returns the affected-row count; zero is a
    /// valid result.
    pub fn update(&self, sql: &str, params: &[SqlValue]) -> Result<usize> {
        self.with_connection(|conn| execute(conn, sql, params))
    }

    /// Executes an update that must affect exactly one row.
    pub fn update_single(&self, sql: &str, params: &[SqlValue]) -> Result<()> {
        self.with_connection(|conn| execute_single(conn, sql, params))
    }

    /// Executes a delete and returns the affected-row count; zero is a
    /// valid result.
    pub fn delete(&self, sql: &str, params: &[SqlValue]) -> Result<usize> {
        self.with_connection(|conn| execute(conn, sql, params))
    }

    /// Executes a delete that must affect exactly one row.
    pub fn delete_single(&self, sql: &str, params: &[SqlValue]) -> Result<()> {
        self.with_connection(|conn| execute_single(conn, sql, params))
    }
}

fn ensure_sql(sql: &str) -> Result<()> {
    if sql.trim().is_empty() {
        return Err(DbError::InvalidArgument(
            "SQL statement must not be blank".to_string(),
        ));
    }
    Ok(())
}

/// Prepares `sql` and binds `params` positionally, 1..N in slice order.
fn bind<'c>(conn: &'c Connection, sql: &str, params: &[SqlValue]) -> Result<Statement<'c>> {
    let mut stmt = conn.prepare(sql)?;
    for (index, value) in params.iter().enumerate() {
        stmt.raw_bind_parameter(index + 1, value)?;
    }
    Ok(stmt)
}

fn query_single<T, F>(conn: &Connection, sql: &str, params: &[SqlValue], mut mapper: F) -> Result<Option<T>>
where
    F: FnMut(&ResultRow<'_>) -> Result<T>,
{
    ensure_sql(sql)?;
    debug!("Executing query: '{}' with values {:?}", sql, params);
    let mut stmt = bind(conn, sql, params)?;
    let mut rows = stmt.raw_query();
    match rows.next()? {
        Some(row) => Ok(Some(mapper(&ResultRow::new(row))?)),
        None => Ok(None),
    }
}

fn query_list<T, F>(conn: &Connection, sql: &str, params: &[SqlValue], mut mapper: F) -> Result<Vec<T>>
where
    F: FnMut(&ResultRow<'_>) -> Result<T>,
{
    ensure_sql(sql)?;
    debug!("Executing query: '{}' with values {:?}", sql, params);
    let mut stmt = bind(conn, sql, params)?;
    let mut rows = stmt.raw_query();
    let mut results = Vec::new();
    while let Some(row) = rows.next()? {
        results.push(mapper(&ResultRow::new(row))?);
    }
    Ok(results)
}

fn execute(conn: &Connection, sql: &str, params: &[SqlValue]) -> Result<usize> {
    ensure_sql(sql)?;
    debug!("Executing statement: '{}' with values {:?}", sql, params);
    let mut stmt = bind(conn, sql, params)?;
    Ok(stmt.raw_execute()?)
}

fn execute_single(conn: &Connection, sql: &str, params: &[SqlValue]) -> Result<()> {
    match execute(conn, sql, params)? {
        0 => Err(DbError::NoRowAffected),
        1 => Ok(()),
        affected => Err(DbError::MultipleRowsAffected(affected)),
    }
}

fn insert_returning_key(conn: &Connection, sql: &str, key_column: &str, params: &[SqlValue]) -> Result<i64> {
    ensure_sql(sql)?;
    if key_column.trim().is_empty() {
        return Err(DbError::InvalidArgument(
            "key column must be specified".to_string(),
        ));
    }
    // RETURNING is the driver-native way to request generated keys.
    let sql = format!(
        "{} RETURNING {}",
        sql.trim_end().trim_end_matches(';'),
        key_column
    );
    debug!("Executing statement: '{}' with values {:?}", sql, params);
    let mut stmt = bind(conn, &sql, params)?;
    let mut rows = stmt.raw_query();
    match rows.next()? {
        Some(row) => Ok(row.get(0)?),
        // The statement ran to completion without yielding a key row.
        None if conn.changes() == 0 => Err(DbError::NoRowsAffected),
        None => Err(DbError::NoKeyGenerated),
    }
}
