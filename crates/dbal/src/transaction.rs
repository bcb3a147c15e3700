//! Transaction wrapper.
//!
//! [`Database::transaction`] runs a callback between BEGIN and COMMIT. An
//! error from the callback rolls back and is reported in the result; the
//! callback's own `bool` becomes the success flag after commit.
//!
//! Transactions do not nest: the connection has a single active-transaction
//! flag, and a nested call fails without touching the outer transaction.
//!
//! # Example
//!
//! ```
//! use dbal::prelude::*;
//!
//! let db = Database::new(DatabaseConfig::sqlite_memory())?;
//! db.create("accounts").column("id", "INTEGER").column("balance", "INTEGER").execute()?;
//! db.insert("accounts").set("id", 1).set("balance", 100).execute()?;
//!
//! let result = db.transaction(|db| {
//!     db.update("accounts").set("balance", 50).where_eq("id", 1).execute()?;
//!     Err(DbError::structural("changed my mind"))
//! });
//! assert!(!result.success());
//!
//! let balance = db.select().columns(&["balance"]).from("accounts")?.execute()?.reducer()?;
//! assert_eq!(balance.first_int()?, Some(100));
//! # Ok::<(), DbError>(())
//! ```

use crate::database::Database;
use crate::error::{DbError, DbResult};

/// Outcome of [`Database::transaction`].
#[derive(Debug)]
pub struct TransactionResult {
    success: bool,
    error: Option<DbError>,
}

impl TransactionResult {
    fn committed(success: bool) -> Self {
        Self {
            success,
            error: None,
        }
    }

    fn failed(error: DbError) -> Self {
        Self {
            success: false,
            error: Some(error),
        }
    }

    /// Committed and the callback reported success.
    pub fn success(&self) -> bool {
        self.success
    }

    /// Why the transaction failed, if it did.
    pub fn error(&self) -> Option<&DbError> {
        self.error.as_ref()
    }

    /// `Ok(flag)` after a commit, `Err` otherwise.
    pub fn into_result(self) -> DbResult<bool> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.success),
        }
    }
}

impl Database {
    /// Run `f` inside a transaction.
    ///
    /// - `Ok(flag)`: commit; the result's success is `flag`.
    /// - `Err(e)`: roll back; the result carries `e`.
    /// - Begin failure: the result carries the backend error.
    /// - Commit failure: roll back; the result carries the backend error.
    pub fn transaction<F>(&self, f: F) -> TransactionResult
    where
        F: FnOnce(&Database) -> DbResult<bool>,
    {
        let begun = self.with_connection(|conn| {
            if conn.in_transaction() {
                return Err(DbError::structural("nested transactions are not supported"));
            }
            conn.begin().map_err(|e| DbError::database(e, None))
        });
        if let Err(e) = begun {
            return TransactionResult::failed(e);
        }

        match f(self) {
            Ok(success) => {
                match self.with_connection(|conn| conn.commit().map_err(|e| DbError::database(e, None))) {
                    Ok(()) => TransactionResult::committed(success),
                    // A refused COMMIT (deferred constraint, busy) leaves the transaction open.
                    Err(error) => self.rollback_after(error),
                }
            }
            Err(error) => self.rollback_after(error),
        }
    }

    /// Roll back the open transaction and report `error` as the failure.
    fn rollback_after(&self, error: DbError) -> TransactionResult {
        let rolled_back = self.with_connection(|conn| {
            if !conn.in_transaction() {
                return Ok(());
            }
            conn.rollback().map_err(|e| DbError::database(e, None))
        });
        if let Err(_rollback_err) = rolled_back {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                target: "dbal.sql",
                error = %error,
                rollback_error = %_rollback_err,
                "rollback failed"
            );
        }
        TransactionResult::failed(error)
    }

    /// Whether a transaction is open on this handle's connection.
    pub fn in_transaction(&self) -> bool {
        self.connection
            .try_borrow()
            .ok()
            .and_then(|slot| slot.as_ref().map(|conn| conn.in_transaction()))
            .unwrap_or(false)
    }
}
