// Product DAO Port (Interface)

use crate::domain::{Product, ProductId, ProductWithCompany};
use crate::error::Result;
use crate::port::CrudDao;
use async_trait::async_trait;

#[async_trait]
pub trait ProductDao: CrudDao<Product> {
    /// Load a product and eagerly resolve its company reference
    async fn find_one_fetch_company(&self, id: ProductId) -> Result<ProductWithCompany>;
}
