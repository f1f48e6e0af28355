// SQLite Transactional Executor
//
// acquire -> [query_only] -> BEGIN -> work -> COMMIT | ROLLBACK -> release

use crate::error::map_sqlx_error;
use daokit_core::error::{DaoError, Result};
use futures::future::BoxFuture;
use sqlx::{Connection, SqliteConnection, SqlitePool};
use tracing::{debug, warn};

/// Runs data-access logic inside exactly one transaction
///
/// Commits when the logic returns `Ok`, rolls back when it returns `Err`.
/// The pooled connection is owned by the call and goes back to the pool (or
/// is closed) on every path, including a failed commit or rollback.
#[derive(Clone)]
pub struct TxExecutor {
    pool: SqlitePool,
}

impl TxExecutor {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Read-write unit of work
    ///
    /// `context` names the operation in error messages, e.g. `"Error saving product"`.
    pub async fn perform_within_tx<T, F>(&self, context: &str, work: F) -> Result<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T>> + Send,
    {
        self.execute(context, false, work).await
    }

    /// Read-only unit of work
    ///
    /// The connection runs with `PRAGMA query_only = ON`, so any write made by
    /// `work` fails with SQLITE_READONLY and the whole transaction rolls back.
    pub async fn read_within_tx<T, F>(&self, context: &str, work: F) -> Result<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T>> + Send,
    {
        self.execute(context, true, work).await
    }

    async fn execute<T, F>(&self, context: &str, read_only: bool, work: F) -> Result<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T>> + Send,
    {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| failed(context, "could not acquire connection", e))?;
        debug!(context, read_only, "Connection acquired");

        if read_only {
            set_query_only(&mut conn, true)
                .await
                .map_err(|e| failed(context, "could not enter read-only mode", e))?;
        }

        let outcome = run_in_tx(&mut conn, context, work).await;

        if read_only {
            if let Err(e) = set_query_only(&mut conn, false).await {
                // Never hand a read-only connection back to the pool
                warn!(context, error = %e, "Failed to leave read-only mode, closing connection");
                if let Err(e) = conn.close().await {
                    warn!(context, error = %e, "Failed to close connection");
                }
            }
        }

        outcome
    }
}

async fn run_in_tx<T, F>(conn: &mut SqliteConnection, context: &str, work: F) -> Result<T>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T>> + Send,
{
    let mut tx = conn
        .begin()
        .await
        .map_err(|e| failed(context, "could not begin transaction", e))?;
    debug!(context, "Transaction started");

    match work(&mut *tx).await {
        Ok(value) => {
            // A failed commit drops `tx` while still open, which rolls it back
            tx.commit()
                .await
                .map_err(|e| rolled_back(context, map_sqlx_error(e)))?;
            debug!(context, "Transaction committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(context, error = %rollback_err, "Rollback failed");
            }
            debug!(context, error = %err, "Transaction rolled back");
            Err(rolled_back(context, err))
        }
    }
}

async fn set_query_only(conn: &mut SqliteConnection, on: bool) -> sqlx::Result<()> {
    let pragma = if on {
        "PRAGMA query_only = ON"
    } else {
        "PRAGMA query_only = OFF"
    };
    sqlx::query(pragma).execute(conn).await.map(|_| ())
}

/// Failure before any transaction was open
fn failed(context: &str, step: &str, err: sqlx::Error) -> DaoError {
    DaoError::persistence(format!("{}: {}", context, step), map_sqlx_error(err))
}

/// Store failures are re-labelled with the operation context and keep the
/// original error as source. `NotFound`, `MissingId` and `Validation` are
/// returned unchanged.
fn rolled_back(context: &str, err: DaoError) -> DaoError {
    match err {
        DaoError::Persistence { .. } => DaoError::persistence(
            format!("{}. Transaction is rolled back", context),
            err,
        ),
        other => other,
    }
}
