// Core infrastructure modules
pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use db::connection::{ConnectionSource, DbSession, MemorySource, SqliteConfig, SqliteSource};
pub use db::params::SqlValue;
pub use db::row::ResultRow;
pub use error::{DbError, Result};
