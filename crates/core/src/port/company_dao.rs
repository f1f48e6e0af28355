// Company DAO Port (Interface)

use crate::domain::{Company, CompanyId, CompanyWithProducts};
use crate::error::Result;
use crate::port::CrudDao;
use async_trait::async_trait;

#[async_trait]
pub trait CompanyDao: CrudDao<Company> {
    /// Load a company with its products in one read-only transaction.
    ///
    /// A company without products yields an empty collection.
    async fn find_by_id_fetch_products(&self, id: CompanyId) -> Result<CompanyWithProducts>;
}
