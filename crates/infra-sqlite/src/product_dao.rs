// SQLite ProductDao Implementation (plain parameterized SQL)

use crate::company_dao::select_company;
use crate::error::{map_sqlx_error, parse_decimal};
use crate::TxExecutor;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use daokit_core::domain::{require_id, Entity, Product, ProductId, ProductWithCompany};
use daokit_core::error::{DaoError, Result};
use daokit_core::port::{CrudDao, ProductDao, TimeProvider};
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;

pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, producer, price, expiration_date, creation_time, company_id";

pub struct SqliteProductDao {
    executor: TxExecutor,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteProductDao {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            executor: TxExecutor::new(pool),
            time_provider,
        }
    }
}

#[async_trait]
impl CrudDao<Product> for SqliteProductDao {
    async fn save(&self, product: &mut Product) -> Result<()> {
        product.validate()?;
        let now = self.time_provider.now();
        let row = product.clone();

        let id = self
            .executor
            .perform_within_tx("Error saving product", move |conn| {
                Box::pin(async move {
                    let done = sqlx::query(
                        r#"
                        INSERT INTO product (
                            name, producer, price, expiration_date, creation_time, company_id
                        ) VALUES (?, ?, ?, ?, ?, ?)
                        "#,
                    )
                    .bind(&row.name)
                    .bind(&row.producer)
                    .bind(row.price.to_string())
                    .bind(row.expiration_date)
                    .bind(now)
                    .bind(row.company_id)
                    .execute(conn)
                    .await
                    .map_err(map_sqlx_error)?;

                    Ok(done.last_insert_rowid())
                })
            })
            .await?;

        product.id = Some(id);
        product.creation_time = Some(now);
        Ok(())
    }

    async fn find_one(&self, id: ProductId) -> Result<Product> {
        self.executor
            .read_within_tx("Error finding product by id", move |conn| {
                Box::pin(async move { select_product(conn, id).await })
            })
            .await
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        self.executor
            .read_within_tx("Error finding all products", |conn| {
                Box::pin(async move {
                    let rows: Vec<ProductRow> = sqlx::query_as(&format!(
                        "SELECT {} FROM product ORDER BY id ASC",
                        PRODUCT_COLUMNS
                    ))
                    .fetch_all(conn)
                    .await
                    .map_err(map_sqlx_error)?;

                    rows.into_iter().map(ProductRow::into_product).collect()
                })
            })
            .await
    }

    async fn update(&self, product: &Product) -> Result<()> {
        let id = require_id(product, "update")?;
        product.validate()?;
        let row = product.clone();

        self.executor
            .perform_within_tx("Error updating product", move |conn| {
                Box::pin(async move {
                    let done = sqlx::query(
                        r#"
                        UPDATE product
                        SET name = ?, producer = ?, price = ?, expiration_date = ?, company_id = ?
                        WHERE id = ?
                        "#,
                    )
                    .bind(&row.name)
                    .bind(&row.producer)
                    .bind(row.price.to_string())
                    .bind(row.expiration_date)
                    .bind(row.company_id)
                    .bind(id)
                    .execute(conn)
                    .await
                    .map_err(map_sqlx_error)?;

                    if done.rows_affected() == 0 {
                        return Err(DaoError::not_found(Product::NAME, id));
                    }
                    Ok(())
                })
            })
            .await
    }

    async fn remove(&self, product: &Product) -> Result<()> {
        let id = require_id(product, "remove")?;

        self.executor
            .perform_within_tx("Error removing product", move |conn| {
                Box::pin(async move {
                    sqlx::query("DELETE FROM product WHERE id = ?")
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
impl ProductDao for SqliteProductDao {
    async fn find_one_fetch_company(&self, id: ProductId) -> Result<ProductWithCompany> {
        self.executor
            .read_within_tx("Error finding product with company", move |conn| {
                Box::pin(async move {
                    let product = select_product(&mut *conn, id).await?;
                    let company = match product.company_id {
                        Some(company_id) => Some(select_company(conn, company_id).await?),
                        None => None,
                    };
                    Ok(ProductWithCompany { product, company })
                })
            })
            .await
    }
}

async fn select_product(conn: &mut SqliteConnection, id: ProductId) -> Result<Product> {
    let row: Option<ProductRow> = sqlx::query_as(&format!(
        "SELECT {} FROM product WHERE id = ?",
        PRODUCT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(map_sqlx_error)?;

    row.ok_or_else(|| DaoError::not_found(Product::NAME, id))?
        .into_product()
}

/// SQLite row representation of `product`
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: i64,
    name: String,
    producer: String,
    price: String, // decimal as TEXT
    expiration_date: NaiveDate,
    creation_time: NaiveDateTime,
    company_id: Option<i64>,
}

impl ProductRow {
    pub(crate) fn into_product(self) -> Result<Product> {
        Ok(Product {
            id: Some(self.id),
            name: self.name,
            producer: self.producer,
            price: parse_decimal("product.price", &self.price)?,
            expiration_date: self.expiration_date,
            creation_time: Some(self.creation_time),
            company_id: self.company_id,
        })
    }
}
