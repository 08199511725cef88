//! Database access layer.
//!
//! This module provides the core data-access functionality for sqlmid,
//! organized into focused submodules:
//! - **Connection Management** (`connection.rs`): connection sources, the
//!   session, and the transaction lifecycle
//! - **Parameter Binding** (`params.rs`): the closed set of bindable
//!   statement values
//! - **Row Access** (`row.rs`): typed, null-aware extraction from one
//!   fetched row
//! - **Statement Execution** (`statement.rs`): parameterized queries and
//!   writes with row-count invariants
//! - **Units of Work** (`transaction.rs`): reentrant execution against the
//!   session transaction
//!
//! All operations use the crate-wide `DbError` type for consistent error
//! propagation.

pub mod connection;
pub mod params;
pub mod row;
pub mod statement;
pub mod transaction;

pub use connection::{ConnectionSource, DbSession, MemorySource, SqliteConfig, SqliteSource};
pub use params::SqlValue;
pub use row::ResultRow;
