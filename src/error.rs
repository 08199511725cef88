//! Error types for sqlmid.
//!
//! All operations in this crate report failures through the single `DbError`
//! enum, so callers can distinguish "my statement is wrong" from "the
//! database failed" from "a precondition was violated" without string
//! matching. Nothing here retries; every failure is surfaced to the caller
//! once any necessary cleanup has run.

use thiserror::Error;

/// Closed error taxonomy for the data-access layer.
#[derive(Error, Debug)]
pub enum DbError {
    /// A local precondition was violated before the driver was touched
    /// (blank SQL, blank key column).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The driver rejected the statement at the syntax or schema level:
    /// bad grammar, unknown table, unknown column.
    #[error("malformed SQL: {0}")]
    MalformedSql(#[source] rusqlite::Error),

    /// Any other driver failure (connectivity, constraint violation,
    /// type mismatch, lock contention).
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// An insert executed cleanly but affected no rows.
    #[error("statement affected no rows")]
    NoRowsAffected,

    /// A single-row update or delete matched no rows.
    #[error("expected exactly one affected row, found none")]
    NoRowAffected,

    /// A single-row update or delete matched more than one row.
    #[error("expected exactly one affected row, found {0}")]
    MultipleRowsAffected(usize),

    /// An insert succeeded but the driver produced no generated key row.
    #[error("insert succeeded but produced no generated key")]
    NoKeyGenerated,

    /// A required column was NULL or missing from the row shape.
    #[error("required column '{0}' was not present")]
    RequiredColumnMissing(String),

    #[error("unable to start transaction, transaction already in progress")]
    TransactionAlreadyActive,

    #[error("no transaction in progress")]
    NoActiveTransaction,

    /// A unit of work failed; the surrounding transaction has been rolled
    /// back. The original failure is the source of this error.
    #[error("unit of work failed, transaction rolled back")]
    TransactionFailed(#[source] Box<DbError>),
}

/// Type alias for Result to use DbError as the error type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Translate a raw driver failure into the taxonomy. Syntax and schema
/// level rejections become `MalformedSql`; everything else is `Database`.
impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        if is_syntax_error(&err) {
            DbError::MalformedSql(err)
        } else {
            DbError::Database(err)
        }
    }
}

fn is_syntax_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqlInputError { .. } => true,
        // Plain SQLITE_ERROR covers "no such table" and friends on builds
        // that do not report an error offset.
        rusqlite::Error::SqliteFailure(cause, _) => {
            cause.extended_code == rusqlite::ffi::SQLITE_ERROR
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn prepare_error(sql: &str) -> DbError {
        let conn = Connection::open_in_memory().unwrap();
        DbError::from(conn.prepare(sql).unwrap_err())
    }

    #[test]
    fn bad_grammar_classifies_as_malformed_sql() {
        assert!(matches!(prepare_error("asd"), DbError::MalformedSql(_)));
    }

    #[test]
    fn unknown_table_classifies_as_malformed_sql() {
        let err = prepare_error("SELECT * FROM doesnotexist");
        assert!(matches!(err, DbError::MalformedSql(_)));
    }

    #[test]
    fn unknown_column_classifies_as_malformed_sql() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE customer (id INTEGER, name TEXT)")
            .unwrap();
        let err = conn.prepare("SELECT id, name, age FROM customer").unwrap_err();
        assert!(matches!(DbError::from(err), DbError::MalformedSql(_)));
    }

    #[test]
    fn constraint_violation_classifies_as_database_error() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY); INSERT INTO t VALUES (1);")
            .unwrap();
        let err = conn.execute("INSERT INTO t VALUES (1)", []).unwrap_err();
        assert!(matches!(DbError::from(err), DbError::Database(_)));
    }

    #[test]
    fn transaction_failed_keeps_its_cause() {
        let err = DbError::TransactionFailed(Box::new(DbError::NoRowsAffected));
        let source = std::error::Error::source(&err).expect("cause should be preserved");
        assert!(source.to_string().contains("no rows"));
    }

    #[test]
    fn display_messages_name_the_condition() {
        assert!(DbError::TransactionAlreadyActive
            .to_string()
            .contains("already in progress"));
        assert!(DbError::RequiredColumnMissing("age".to_string())
            .to_string()
            .contains("'age'"));
        assert!(DbError::MultipleRowsAffected(3).to_string().contains('3'));
    }
}
