//! Transaction boundary shared by every service.
//!
//! Each public operation performs exactly one [`Store::run_in_transaction`] or
//! [`Store::run_read_only`] call, so callers never observe a partially applied operation.

use futures_util::future::BoxFuture;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::errors::AppError;

/// Thin wrapper around the pooled connection that owns the transaction discipline.
#[derive(Debug, Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection, for migrations and start-up checks.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Run `action` inside a single transaction.
    ///
    /// Writes made through the transaction handle are committed together when `action`
    /// returns `Ok`. If it returns `Err`, everything is rolled back and the error is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the error raised by `action`, or [`AppError::Store`] if the transaction
    /// cannot be opened or committed.
    pub async fn run_in_transaction<T, F>(&self, action: F) -> Result<T, AppError>
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, AppError>> + Send,
        T: Send,
    {
        let txn = self.db.begin().await.inspect_err(log_store_error)?;

        match action(&txn).await {
            Ok(value) => {
                txn.commit().await.inspect_err(log_store_error)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!(error = %rollback_err, "Failed to roll back transaction");
                }
                match &err {
                    AppError::Validation(reason) => {
                        tracing::debug!(%reason, "Operation rejected");
                    }
                    other => tracing::error!(error = %other, "Transaction rolled back"),
                }
                Err(err)
            }
        }
    }

    /// Run a read-only `action` against the pool without opening a write transaction.
    ///
    /// The action must not write; it sees each statement's committed state.
    ///
    /// # Errors
    ///
    /// Returns the error raised by `action`.
    pub async fn run_read_only<T, F>(&self, action: F) -> Result<T, AppError>
    where
        F: for<'c> FnOnce(&'c DatabaseConnection) -> BoxFuture<'c, Result<T, AppError>> + Send,
        T: Send,
    {
        action(&self.db).await.inspect_err(|err| match err {
            AppError::Validation(reason) => tracing::debug!(%reason, "Query rejected"),
            other => tracing::error!(error = %other, "Read-only query failed"),
        })
    }
}

fn log_store_error(err: &sea_orm::DbErr) {
    tracing::error!(error = %err, "Transaction could not be started or committed");
}
