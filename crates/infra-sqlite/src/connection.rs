// SQLite Connection Pool Setup

use crate::error::map_sqlx_error;
use crate::StoreConfig;
use daokit_core::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

/// Create the shared SQLite pool with WAL mode and foreign keys enforced
///
/// The pool is the process-wide connection provider: create it once and hand
/// clones to every DAO.
pub async fn create_pool(store: &StoreConfig) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&store.database_url)
        .map_err(map_sqlx_error)?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(store.busy_timeout())
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(store.max_connections)
        // A read-only run dropped before it finished returns its connection
        // with query_only still ON
        .before_acquire(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA query_only = OFF").execute(conn).await?;
                Ok(true)
            })
        })
        .connect_with(options)
        .await
        .map_err(map_sqlx_error)?;

    info!(
        database_url = %store.database_url,
        max_connections = store.max_connections,
        "Connection pool ready"
    );
    Ok(pool)
}

/// In-memory pool, shared by all of its connections
pub async fn create_memory_pool() -> Result<SqlitePool> {
    create_pool(&StoreConfig {
        database_url: "sqlite::memory:".to_string(),
        ..StoreConfig::default()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool() {
        let pool = create_memory_pool().await.unwrap();
        assert!(pool.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let pool = create_memory_pool().await.unwrap();
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_acquire_resets_query_only() {
        let pool = create_pool(&StoreConfig {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..StoreConfig::default()
        })
        .await
        .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        sqlx::query("PRAGMA query_only = ON")
            .execute(&mut *conn)
            .await
            .unwrap();
        drop(conn);

        let query_only: i64 = sqlx::query_scalar("PRAGMA query_only")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(query_only, 0);
    }
}
