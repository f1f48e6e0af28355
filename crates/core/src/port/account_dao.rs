// Account DAO Port (Interface)

use crate::domain::Account;
use crate::error::Result;
use crate::port::CrudDao;
use async_trait::async_trait;

#[async_trait]
pub trait AccountDao: CrudDao<Account> {
    /// Find by the unique email column, failing with `NotFound` when absent
    async fn find_by_email(&self, email: &str) -> Result<Account>;
}
