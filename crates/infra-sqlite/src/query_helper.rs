// Ad-hoc read-only queries

use crate::TxExecutor;
use daokit_core::error::Result;
use futures::future::BoxFuture;
use sqlx::{SqliteConnection, SqlitePool};

/// Runs caller-supplied read logic in a read-only transaction
///
/// For queries that don't belong to any DAO (reports, joins across
/// aggregates). Writes attempted inside the closure fail and roll back.
#[derive(Clone)]
pub struct QueryHelper {
    executor: TxExecutor,
}

impl QueryHelper {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            executor: TxExecutor::new(pool),
        }
    }

    pub async fn read_within_tx<T, F>(&self, query: F) -> Result<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T>> + Send,
    {
        self.executor
            .read_within_tx("Error performing query", query)
            .await
    }
}
