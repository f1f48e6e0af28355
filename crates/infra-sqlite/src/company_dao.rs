// SQLite CompanyDao Implementation

use crate::error::map_sqlx_error;
use crate::product_dao::{ProductRow, PRODUCT_COLUMNS};
use crate::TxExecutor;
use async_trait::async_trait;
use daokit_core::domain::{require_id, Company, CompanyId, CompanyWithProducts, Entity};
use daokit_core::error::{DaoError, Result};
use daokit_core::port::{CompanyDao, CrudDao};
use sqlx::{SqliteConnection, SqlitePool};

pub struct SqliteCompanyDao {
    executor: TxExecutor,
}

impl SqliteCompanyDao {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            executor: TxExecutor::new(pool),
        }
    }
}

#[async_trait]
impl CrudDao<Company> for SqliteCompanyDao {
    async fn save(&self, company: &mut Company) -> Result<()> {
        company.validate()?;
        let name = company.name.clone();

        let id = self
            .executor
            .perform_within_tx("Error saving company", move |conn| {
                Box::pin(async move {
                    let done = sqlx::query("INSERT INTO company (name) VALUES (?)")
                        .bind(&name)
                        .execute(conn)
                        .await
                        .map_err(map_sqlx_error)?;
                    Ok(done.last_insert_rowid())
                })
            })
            .await?;

        company.id = Some(id);
        Ok(())
    }

    async fn find_one(&self, id: CompanyId) -> Result<Company> {
        self.executor
            .read_within_tx("Error finding company by id", move |conn| {
                Box::pin(async move { select_company(conn, id).await })
            })
            .await
    }

    async fn find_all(&self) -> Result<Vec<Company>> {
        self.executor
            .read_within_tx("Error finding all companies", |conn| {
                Box::pin(async move {
                    let rows: Vec<CompanyRow> =
                        sqlx::query_as("SELECT id, name FROM company ORDER BY id ASC")
                            .fetch_all(conn)
                            .await
                            .map_err(map_sqlx_error)?;
                    Ok(rows.into_iter().map(CompanyRow::into_company).collect())
                })
            })
            .await
    }

    async fn update(&self, company: &Company) -> Result<()> {
        let id = require_id(company, "update")?;
        company.validate()?;
        let name = company.name.clone();

        self.executor
            .perform_within_tx("Error updating company", move |conn| {
                Box::pin(async move {
                    let done = sqlx::query("UPDATE company SET name = ? WHERE id = ?")
                        .bind(&name)
                        .bind(id)
                        .execute(conn)
                        .await
                        .map_err(map_sqlx_error)?;
                    if done.rows_affected() == 0 {
                        return Err(DaoError::not_found(Company::NAME, id));
                    }
                    Ok(())
                })
            })
            .await
    }

    /// Products still pointing at the company make this fail; detach or
    /// remove them first.
    async fn remove(&self, company: &Company) -> Result<()> {
        let id = require_id(company, "remove")?;

        self.executor
            .perform_within_tx("Error removing company", move |conn| {
                Box::pin(async move {
                    sqlx::query("DELETE FROM company WHERE id = ?")
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
impl CompanyDao for SqliteCompanyDao {
    async fn find_by_id_fetch_products(&self, id: CompanyId) -> Result<CompanyWithProducts> {
        self.executor
            .read_within_tx("Error performing read operation", move |conn| {
                Box::pin(async move {
                    let company = select_company(&mut *conn, id).await?;

                    let rows: Vec<ProductRow> = sqlx::query_as(&format!(
                        "SELECT {} FROM product WHERE company_id = ? ORDER BY id ASC",
                        PRODUCT_COLUMNS
                    ))
                    .bind(id)
                    .fetch_all(conn)
                    .await
                    .map_err(map_sqlx_error)?;

                    let products = rows
                        .into_iter()
                        .map(ProductRow::into_product)
                        .collect::<Result<Vec<_>>>()?;

                    Ok(CompanyWithProducts { company, products })
                })
            })
            .await
    }
}

pub(crate) async fn select_company(conn: &mut SqliteConnection, id: CompanyId) -> Result<Company> {
    let row: Option<CompanyRow> = sqlx::query_as("SELECT id, name FROM company WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(map_sqlx_error)?;

    row.map(CompanyRow::into_company)
        .ok_or_else(|| DaoError::not_found(Company::NAME, id))
}

#[derive(Debug, sqlx::FromRow)]
struct CompanyRow {
    id: i64,
    name: String,
}

impl CompanyRow {
    fn into_company(self) -> Company {
        Company {
            id: Some(self.id),
            name: self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_memory_pool, run_migrations, SqliteProductDao};
    use chrono::NaiveDate;
    use daokit_core::domain::Product;
    use daokit_core::port::SystemTimeProvider;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    async fn setup_test_db() -> (SqliteCompanyDao, SqliteProductDao) {
        let pool = create_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        (
            SqliteCompanyDao::new(pool.clone()),
            SqliteProductDao::new(pool, Arc::new(SystemTimeProvider)),
        )
    }

    fn product(name: &str, company_id: CompanyId) -> Product {
        Product::new(
            name,
            "Factory",
            Decimal::new(999, 2),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        )
        .with_company(company_id)
    }

    #[tokio::test]
    async fn test_fetch_products_returns_only_own_products() {
        let (companies, products) = setup_test_db().await;
        let mut acme = Company::new("Acme");
        let mut globex = Company::new("Globex");
        companies.save(&mut acme).await.unwrap();
        companies.save(&mut globex).await.unwrap();

        for name in ["Anvil", "Rocket"] {
            products.save(&mut product(name, acme.id.unwrap())).await.unwrap();
        }
        products.save(&mut product("Laser", globex.id.unwrap())).await.unwrap();

        let loaded = companies
            .find_by_id_fetch_products(acme.id.unwrap())
            .await
            .unwrap();
        assert_eq!(loaded.company, acme);
        let names: Vec<&str> = loaded.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Anvil", "Rocket"]);
    }

    #[tokio::test]
    async fn test_fetch_products_of_company_without_products() {
        let (companies, _) = setup_test_db().await;
        let mut empty = Company::new("Initech");
        companies.save(&mut empty).await.unwrap();

        let loaded = companies
            .find_by_id_fetch_products(empty.id.unwrap())
            .await
            .unwrap();
        assert!(loaded.products.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_products_of_missing_company() {
        let (companies, _) = setup_test_db().await;
        let err = companies.find_by_id_fetch_products(77).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_remove_company_with_products_rolls_back() {
        let (companies, products) = setup_test_db().await;
        let mut acme = Company::new("Acme");
        companies.save(&mut acme).await.unwrap();
        products.save(&mut product("Anvil", acme.id.unwrap())).await.unwrap();

        let err = companies.remove(&acme).await.unwrap_err();
        assert!(err.is_persistence());
        assert_eq!(companies.find_one(acme.id.unwrap()).await.unwrap(), acme);
    }

    #[tokio::test]
    async fn test_rename_company() {
        let (companies, _) = setup_test_db().await;
        let mut acme = Company::new("Acme");
        companies.save(&mut acme).await.unwrap();

        acme.name = "Acme Holdings".to_string();
        companies.update(&acme).await.unwrap();

        let all = companies.find_all().await.unwrap();
        assert_eq!(all, vec![acme]);
    }
}
