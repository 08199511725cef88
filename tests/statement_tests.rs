//! End-to-end statement scenarios against a file-backed database.

use sqlmid::{sql_values, ConnectionSource, DbError, DbSession, Result, ResultRow, SqliteSource};
use tempfile::NamedTempFile;

fn map_customer(row: &ResultRow<'_>) -> Result<String> {
    row.require_string("name")
}

fn customer_session() -> (DbSession<SqliteSource>, NamedTempFile) {
    let file = NamedTempFile::new().unwrap();
    let source = SqliteSource::open(file.path().to_str().unwrap());
    {
        let conn = source.connection().unwrap();
        conn.execute_batch("CREATE TABLE customer (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")
            .unwrap();
    }
    (DbSession::new(source), file)
}

#[test]
fn inserted_row_is_found_by_a_later_query() {
    let (session, _file) = customer_session();
    session
        .insert(
            "INSERT INTO customer (id, name) VALUES (?, ?)",
            sql_values![1, "Jon Snow"],
        )
        .unwrap();
    let name = session
        .query_for_single("SELECT * FROM customer WHERE id = ?", sql_values![1], map_customer)
        .unwrap();
    assert_eq!(name, Some("Jon Snow".to_string()));
}

#[test]
fn delete_without_predicate_empties_the_table_and_reports_the_count() {
    let (session, _file) = customer_session();
    session
        .insert(
            "INSERT INTO customer (id, name) VALUES (?, ?), (?, ?)",
            sql_values![1, "Jon Snow", 2, "Arya Stark"],
        )
        .unwrap();
    let affected = session.delete("DELETE FROM customer", sql_values![]).unwrap();
    assert_eq!(affected, 2);
    let remaining = session
        .query_for_list("SELECT * FROM customer", sql_values![], map_customer)
        .unwrap();
    assert!(remaining.is_empty());
}

#[test]
fn selecting_an_unknown_column_reports_malformed_sql() {
    let (session, _file) = customer_session();
    let err = session
        .query_for_list("SELECT id, name, age FROM customer", sql_values![], map_customer)
        .unwrap_err();
    assert!(matches!(err, DbError::MalformedSql(_)));
}

#[test]
fn generated_key_round_trips_through_a_query() {
    let (session, _file) = customer_session();
    let key = session
        .insert_and_return_key(
            "INSERT INTO customer (name) VALUES (?)",
            "id",
            sql_values!["Thormund Giantsbane"],
        )
        .unwrap();
    let name = session
        .query_for_single("SELECT * FROM customer WHERE id = ?", sql_values![key], map_customer)
        .unwrap();
    assert_eq!(name, Some("Thormund Giantsbane".to_string()));
}

#[test]
fn typed_extraction_distinguishes_null_from_zero() {
    let file = NamedTempFile::new().unwrap();
    let source = SqliteSource::open(file.path().to_str().unwrap());
    {
        let conn = source.connection().unwrap();
        conn.execute_batch(
            "CREATE TABLE account (id INTEGER PRIMARY KEY, balance INTEGER, opened TEXT);
             INSERT INTO account (id, balance, opened) VALUES (1, 0, '2021-03-04');
             INSERT INTO account (id, balance, opened) VALUES (2, NULL, NULL);",
        )
        .unwrap();
    }
    let session = DbSession::new(source);

    let rows = session
        .query_for_list("SELECT * FROM account ORDER BY id", sql_values![], |row| {
            Ok((row.get_long("balance")?, row.get_date("opened")?))
        })
        .unwrap();
    let expected_date = chrono::NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
    assert_eq!(rows[0], (Some(0), Some(expected_date)));
    assert_eq!(rows[1], (None, None));
}

#[test]
fn queries_are_read_only_and_repeatable() {
    let (session, _file) = customer_session();
    session
        .insert(
            "INSERT INTO customer (id, name) VALUES (?, ?)",
            sql_values![1, "Jon Snow"],
        )
        .unwrap();
    let first = session
        .query_for_list("SELECT * FROM customer", sql_values![], map_customer)
        .unwrap();
    let second = session
        .query_for_list("SELECT * FROM customer", sql_values![], map_customer)
        .unwrap();
    assert_eq!(first, second);
}
