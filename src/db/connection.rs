//! Connection Management Module
//!
//! Connection sources hand out one physical connection per request, in the
//! manner of a driver-level data source. The session binds at most one of
//! those connections to an in-progress transaction; operations outside a
//! transaction run on a fresh connection that is released as soon as the
//! operation returns.

use crate::error::{DbError, Result};
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Supplier of physical database connections.
///
/// Implementations open a fresh connection on every call; pooling, if any,
/// lives behind this trait, not in front of it.
pub trait ConnectionSource {
    fn connection(&self) -> Result<Connection>;
}

/// Configuration for a file-backed SQLite source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Path (or URI) of the database file.
    pub path: String,
    /// Enforce foreign key constraints on every connection.
    pub foreign_keys: bool,
    /// Use write-ahead logging so readers are not blocked by a writer on
    /// another connection.
    pub wal: bool,
}

impl SqliteConfig {
    pub fn new(path: impl Into<String>) -> Self {
        SqliteConfig {
            path: path.into(),
            foreign_keys: true,
            wal: true,
        }
    }
}

/// File-backed connection source.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    config: SqliteConfig,
}

impl SqliteSource {
    pub fn new(config: SqliteConfig) -> Self {
        SqliteSource { config }
    }

    /// Source for `path` with the default pragmas.
    pub fn open(path: impl Into<String>) -> Self {
        SqliteSource::new(SqliteConfig::new(path))
    }
}

impl ConnectionSource for SqliteSource {
    fn connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.config.path)?;
        if self.config.foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }
        if self.config.wal {
            // journal_mode reports the resulting mode as a row
            conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
        }
        Ok(conn)
    }
}

static MEMORY_DB_ID: AtomicU64 = AtomicU64::new(0);

/// Named shared-cache in-memory database.
///
/// All connections opened from one source see the same data. The source
/// keeps a single anchor connection open for its own lifetime; without it
/// the database would be destroyed whenever the last per-operation
/// connection closed.
#[derive(Debug)]
pub struct MemorySource {
    uri: String,
    _anchor: Connection,
}

impl MemorySource {
    pub fn new() -> Result<Self> {
        let id = MEMORY_DB_ID.fetch_add(1, Ordering::Relaxed);
        let uri = format!("file:sqlmid_mem_{}?mode=memory&cache=shared", id);
        let anchor = open_shared_memory(&uri)?;
        Ok(MemorySource {
            uri,
            _anchor: anchor,
        })
    }
}

impl ConnectionSource for MemorySource {
    fn connection(&self) -> Result<Connection> {
        open_shared_memory(&self.uri)
    }
}

fn open_shared_memory(uri: &str) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(uri, flags)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// One logical execution context for database work.
///
/// A session owns a connection source and a slot for at most one bound
/// transaction connection. Sessions are single-context by construction
/// (not `Sync`); concurrent callers each use their own session over a
/// shared source and never observe each other's uncommitted work.
pub struct DbSession<S> {
    source: S,
    tx: RefCell<Option<Connection>>,
}

impl<S: ConnectionSource> DbSession<S> {
    pub fn new(source: S) -> Self {
        DbSession {
            source,
            tx: RefCell::new(None),
        }
    }

    /// The underlying connection source, e.g. for schema setup.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs `operation` on the connection bound to the active transaction,
    /// or on a freshly acquired connection that is released when the
    /// operation returns, whether it succeeded or failed.
    ///
    /// Transaction lifecycle methods must not be called from inside the
    /// callback; the transaction belongs to the session, not to any single
    /// operation.
    pub fn with_connection<R>(&self, operation: impl FnOnce(&Connection) -> Result<R>) -> Result<R> {
        let bound = self.tx.borrow();
        if let Some(conn) = bound.as_ref() {
            return operation(conn);
        }
        drop(bound);
        let conn = self.source.connection()?;
        operation(&conn)
        // conn dropped here, closing the per-operation connection
    }

    /// Acquires a connection and binds it to this session as the
    /// transaction connection.
    ///
    /// Fails with `TransactionAlreadyActive` if a transaction is already
    /// bound. If the transaction cannot be started the connection is
    /// closed before the error propagates.
    pub fn start_transaction(&self) -> Result<()> {
        if self.is_transaction_active() {
            return Err(DbError::TransactionAlreadyActive);
        }
        debug!("Starting transaction");
        let conn = self.source.connection()?;
        if let Err(err) = conn.execute_batch("BEGIN") {
            if let Err((_, close_err)) = conn.close() {
                warn!("Failed to close connection after failed BEGIN: {}", close_err);
            }
            return Err(DbError::from(err));
        }
        *self.tx.borrow_mut() = Some(conn);
        Ok(())
    }

    /// Commits the bound transaction and releases its connection.
    ///
    /// The binding is cleared unconditionally, even when the commit or the
    /// release fails, so a failed transaction never leaves a stale binding.
    pub fn commit_transaction(&self) -> Result<()> {
        debug!("Committing transaction");
        self.finish_transaction("COMMIT")
    }

    /// Rolls back the bound transaction and releases its connection, with
    /// the same unconditional-clear guarantee as `commit_transaction`.
    pub fn rollback_transaction(&self) -> Result<()> {
        debug!("Rolling back transaction");
        self.finish_transaction("ROLLBACK")
    }

    /// True iff a transaction connection is currently bound.
    pub fn is_transaction_active(&self) -> bool {
        self.tx.borrow().is_some()
    }

    fn finish_transaction(&self, statement: &str) -> Result<()> {
        // Taking the connection out of the slot clears the binding before
        // anything below can fail.
        let conn = self
            .tx
            .borrow_mut()
            .take()
            .ok_or(DbError::NoActiveTransaction)?;
        match conn.execute_batch(statement) {
            Ok(()) => match conn.close() {
                Ok(()) => Ok(()),
                Err((_, close_err)) => Err(DbError::from(close_err)),
            },
            Err(err) => {
                if let Err((_, close_err)) = conn.close() {
                    warn!(
                        "Failed to close connection after failed {}: {}",
                        statement, close_err
                    );
                }
                Err(DbError::from(err))
            }
        }
    }
}
