//! Units of work.
//!
//! `run_in_transaction` wraps a caller-supplied closure so that nested
//! invocations join the transaction already bound to the session instead of
//! starting a second physical transaction. Exactly one commit or rollback
//! happens per outermost invocation.

use crate::db::connection::{ConnectionSource, DbSession};
use crate::error::{DbError, Result};
use tracing::warn;

impl<S: ConnectionSource> DbSession<S> {
    /// Runs `work` inside a transaction on this session.
    ///
    /// When no transaction is active, one is started; the transaction is
    /// committed when `work` returns `Ok` and rolled back when it returns
    /// `Err`, in which case the failure is re-raised as
    /// `DbError::TransactionFailed` with the original error as its source.
    ///
    /// When a transaction is already active, `work` runs directly against
    /// it and the outermost caller keeps ownership of the commit/rollback
    /// decision, so helpers that each run "in a transaction" compose freely.
    pub fn run_in_transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        let owner = !self.is_transaction_active();
        if owner {
            self.start_transaction()?;
        }
        match work(self) {
            Ok(value) => {
                if owner {
                    self.commit_transaction()?;
                }
                Ok(value)
            }
            Err(err) => {
                if owner {
                    if let Err(rollback_err) = self.rollback_transaction() {
                        // The unit-of-work failure stays the primary error.
                        warn!(
                            "Rollback after failed unit of work also failed: {}",
                            rollback_err
                        );
                    }
                }
                Err(DbError::TransactionFailed(Box::new(err)))
            }
        }
    }
}
