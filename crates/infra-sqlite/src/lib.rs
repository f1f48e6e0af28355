// DaoKit Infrastructure - SQLite Adapter
// Implements: ProductDao, AccountDao, CompanyDao, PhotoDao, EmployeeDao, EmployeeProfileDao

mod account_dao;
mod company_dao;
mod config;
mod connection;
mod employee_dao;
mod error;
mod migration;
mod photo_dao;
mod product_dao;
mod query_helper;
mod transaction;

pub use account_dao::SqliteAccountDao;
pub use company_dao::SqliteCompanyDao;
pub use config::StoreConfig;
pub use connection::{create_memory_pool, create_pool};
pub use employee_dao::{SqliteEmployeeDao, SqliteEmployeeProfileDao};
pub use migration::run_migrations;
pub use photo_dao::SqlitePhotoDao;
pub use product_dao::SqliteProductDao;
pub use query_helper::QueryHelper;
pub use transaction::TxExecutor;

// Pool handle type for composition roots that don't depend on sqlx
pub use sqlx::SqlitePool;

// sqlx::Error conversion goes through error::map_sqlx_error because of the
// orphan rule (no From<sqlx::Error> for DaoError in this crate)
