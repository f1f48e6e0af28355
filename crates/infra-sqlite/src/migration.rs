// Migration Runner

use crate::error::map_sqlx_error;
use daokit_core::error::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Ordered list of (version, description, sql)
const MIGRATIONS: &[(i64, &str, &str)] = &[(
    1,
    "Initial schema",
    include_str!("../migrations/001_initial_schema.sql"),
)];

/// Run database migrations not yet recorded in `schema_version`
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    let table_exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
    )
    .fetch_one(pool)
    .await
    .map_err(map_sqlx_error)?;

    let current_version: i64 = if table_exists > 0 {
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await
            .map_err(map_sqlx_error)?
            .unwrap_or(0)
    } else {
        0
    };

    info!("Current schema version: {}", current_version);

    for (version, description, sql) in MIGRATIONS {
        if current_version < *version {
            info!("Applying migration {:03}: {}", version, description);
            apply_migration(pool, sql).await?;
        }
    }

    info!("All migrations applied successfully");
    Ok(())
}

/// Apply one migration script atomically
///
/// The script goes to SQLite as-is, so statements may carry their own
/// semicolons (trigger bodies, string literals) and `--` comments.
async fn apply_migration(pool: &SqlitePool, sql: &str) -> Result<()> {
    let mut tx = pool.begin().await.map_err(map_sqlx_error)?;
    sqlx::raw_sql(sql)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
    tx.commit().await.map_err(map_sqlx_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_memory_pool;

    #[tokio::test]
    async fn test_run_migrations() {
        let pool = create_memory_pool().await.unwrap();
        let result = run_migrations(&pool).await;

        if let Err(e) = &result {
            eprintln!("Migration error: {:?}", e);
        }
        assert!(result.is_ok());

        for table in ["product", "account", "company", "photo", "photo_comment", "employee_profile"] {
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(count, 0, "table {} should start empty", table);
        }
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(version, 1);
    }

    #[tokio::test]
    async fn test_script_with_trigger_body_and_comments() {
        let pool = create_memory_pool().await.unwrap();
        let script = r#"
            -- audit; one row per insert
            CREATE TABLE audit (note TEXT NOT NULL);
            CREATE TABLE item (name TEXT NOT NULL);
            CREATE TRIGGER item_audit AFTER INSERT ON item
            BEGIN
                INSERT INTO audit (note) VALUES ('added; ' || NEW.name);
            END;
        "#;

        apply_migration(&pool, script).await.unwrap();
        sqlx::query("INSERT INTO item (name) VALUES ('bolt')")
            .execute(&pool)
            .await
            .unwrap();

        let note: String = sqlx::query_scalar("SELECT note FROM audit")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(note, "added; bolt");
    }

    #[tokio::test]
    async fn test_failed_script_leaves_no_tables() {
        let pool = create_memory_pool().await.unwrap();
        let script = "CREATE TABLE half_done (id INTEGER); CREATE TABLE broken (;";

        assert!(apply_migration(&pool, script).await.is_err());

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = 'half_done'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(tables, 0);
    }
}
