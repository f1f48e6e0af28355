// SQLite AccountDao Implementation

use crate::error::{map_sqlx_error, parse_decimal};
use crate::TxExecutor;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use daokit_core::domain::{require_id, Account, AccountId, Entity, Gender};
use daokit_core::error::{DaoError, Result};
use daokit_core::port::{AccountDao, CrudDao, TimeProvider};
use sqlx::SqlitePool;
use std::sync::Arc;

const ACCOUNT_COLUMNS: &str =
    "id, first_name, last_name, email, birthday, gender, balance, creation_time";

pub struct SqliteAccountDao {
    executor: TxExecutor,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteAccountDao {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            executor: TxExecutor::new(pool),
            time_provider,
        }
    }
}

#[async_trait]
impl CrudDao<Account> for SqliteAccountDao {
    async fn save(&self, account: &mut Account) -> Result<()> {
        account.validate()?;
        let now = self.time_provider.now();
        let row = account.clone();

        let id = self
            .executor
            .perform_within_tx("Error saving account", move |conn| {
                Box::pin(async move {
                    let done = sqlx::query(
                        r#"
                        INSERT INTO account (
                            first_name, last_name, email, birthday, gender, balance, creation_time
                        ) VALUES (?, ?, ?, ?, ?, ?, ?)
                        "#,
                    )
                    .bind(&row.first_name)
                    .bind(&row.last_name)
                    .bind(&row.email)
                    .bind(row.birthday)
                    .bind(row.gender.to_string())
                    .bind(row.balance.map(|b| b.to_string()))
                    .bind(now)
                    .execute(conn)
                    .await
                    .map_err(map_sqlx_error)?;
                    Ok(done.last_insert_rowid())
                })
            })
            .await?;

        account.id = Some(id);
        account.creation_time = Some(now);
        Ok(())
    }

    async fn find_one(&self, id: AccountId) -> Result<Account> {
        self.executor
            .read_within_tx("Error finding account by id", move |conn| {
                Box::pin(async move {
                    let row: Option<AccountRow> = sqlx::query_as(&format!(
                        "SELECT {} FROM account WHERE id = ?",
                        ACCOUNT_COLUMNS
                    ))
                    .bind(id)
                    .fetch_optional(conn)
                    .await
                    .map_err(map_sqlx_error)?;

                    row.ok_or_else(|| DaoError::not_found(Account::NAME, id))?
                        .into_account()
                })
            })
            .await
    }

    async fn find_all(&self) -> Result<Vec<Account>> {
        self.executor
            .read_within_tx("Error finding all accounts", |conn| {
                Box::pin(async move {
                    let rows: Vec<AccountRow> = sqlx::query_as(&format!(
                        "SELECT {} FROM account ORDER BY id ASC",
                        ACCOUNT_COLUMNS
                    ))
                    .fetch_all(conn)
                    .await
                    .map_err(map_sqlx_error)?;

                    rows.into_iter().map(AccountRow::into_account).collect()
                })
            })
            .await
    }

    async fn update(&self, account: &Account) -> Result<()> {
        let id = require_id(account, "update")?;
        account.validate()?;
        let row = account.clone();

        self.executor
            .perform_within_tx("Error updating account", move |conn| {
                Box::pin(async move {
                    let done = sqlx::query(
                        r#"
                        UPDATE account
                        SET first_name = ?, last_name = ?, email = ?, birthday = ?,
                            gender = ?, balance = ?
                        WHERE id = ?
                        "#,
                    )
                    .bind(&row.first_name)
                    .bind(&row.last_name)
                    .bind(&row.email)
                    .bind(row.birthday)
                    .bind(row.gender.to_string())
                    .bind(row.balance.map(|b| b.to_string()))
                    .bind(id)
                    .execute(conn)
                    .await
                    .map_err(map_sqlx_error)?;

                    if done.rows_affected() == 0 {
                        return Err(DaoError::not_found(Account::NAME, id));
                    }
                    Ok(())
                })
            })
            .await
    }

    async fn remove(&self, account: &Account) -> Result<()> {
        let id = require_id(account, "remove")?;

        self.executor
            .perform_within_tx("Error removing account", move |conn| {
                Box::pin(async move {
                    sqlx::query("DELETE FROM account WHERE id = ?")
                        .bind(id)
                        .execute(conn)
                        .await
                        .map_err(map_sqlx_error)?;
                    Ok(())
                })
            })
            .await
    }
}

#[async_trait]
impl AccountDao for SqliteAccountDao {
    async fn find_by_email(&self, email: &str) -> Result<Account> {
        let email = email.to_string();

        self.executor
            .read_within_tx("Error finding account by email", move |conn| {
                Box::pin(async move {
                    let row: Option<AccountRow> = sqlx::query_as(&format!(
                        "SELECT {} FROM account WHERE email = ?",
                        ACCOUNT_COLUMNS
                    ))
                    .bind(&email)
                    .fetch_optional(conn)
                    .await
                    .map_err(map_sqlx_error)?;

                    row.ok_or_else(|| DaoError::not_found(Account::NAME, &email))?
                        .into_account()
                })
            })
            .await
    }
}

/// SQLite row representation of `account`
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    birthday: NaiveDate,
    gender: String,
    balance: Option<String>, // decimal as TEXT
    creation_time: NaiveDateTime,
}

impl AccountRow {
    fn into_account(self) -> Result<Account> {
        let gender: Gender = self.gender.parse()?;
        let balance = self
            .balance
            .as_deref()
            .map(|raw| parse_decimal("account.balance", raw))
            .transpose()?;

        Ok(Account {
            id: Some(self.id),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            birthday: self.birthday,
            gender,
            balance,
            creation_time: Some(self.creation_time),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_memory_pool, run_migrations};
    use daokit_core::port::FixedTimeProvider;
    use rust_decimal::Decimal;
    use std::error::Error as _;

    async fn setup_test_db() -> SqliteAccountDao {
        let pool = create_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        SqliteAccountDao::new(pool, Arc::new(FixedTimeProvider(now)))
    }

    fn ada() -> Account {
        let mut account = Account::new(
            "Ada",
            "Lovelace",
            "ada@analytical.engine",
            NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
            Gender::Female,
        );
        account.balance = Some(Decimal::new(10_050, 2));
        account
    }

    #[tokio::test]
    async fn test_save_then_find_by_email() {
        let dao = setup_test_db().await;
        let mut account = ada();
        dao.save(&mut account).await.unwrap();

        let found = dao.find_by_email("ada@analytical.engine").await.unwrap();
        assert_eq!(found, account);
        assert_eq!(found.balance, Some(Decimal::new(10_050, 2)));
    }

    #[tokio::test]
    async fn test_find_by_missing_email_is_not_found() {
        let dao = setup_test_db().await;
        let err = dao.find_by_email("missing@x.com").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Account not found: missing@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_persistence_failure() {
        let dao = setup_test_db().await;
        dao.save(&mut ada()).await.unwrap();

        let mut twin = ada();
        let err = dao.save(&mut twin).await.unwrap_err();

        assert!(err.is_persistence());
        assert_eq!(err.to_string(), "Error saving account. Transaction is rolled back");
        let cause = err.source().unwrap().to_string();
        assert!(cause.contains("Unique constraint violation"), "cause: {}", cause);
        assert!(twin.id.is_none());
        assert_eq!(dao.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_then_remove() {
        let dao = setup_test_db().await;
        let mut account = ada();
        dao.save(&mut account).await.unwrap();

        account.email = "countess@lovelace.uk".to_string();
        account.balance = None;
        dao.update(&account).await.unwrap();
        let found = dao.find_one(account.id.unwrap()).await.unwrap();
        assert_eq!(found.email, "countess@lovelace.uk");
        assert!(found.balance.is_none());

        dao.remove(&account).await.unwrap();
        assert!(dao.find_all().await.unwrap().is_empty());
    }
}
