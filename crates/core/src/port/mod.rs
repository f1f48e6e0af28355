// Port Layer - Interfaces implemented by storage adapters

pub mod account_dao;
pub mod company_dao;
pub mod crud_dao;
pub mod employee_dao;
pub mod photo_dao;
pub mod product_dao;
pub mod time_provider;

// Re-exports
pub use account_dao::AccountDao;
pub use company_dao::CompanyDao;
pub use crud_dao::CrudDao;
pub use employee_dao::{EmployeeDao, EmployeeProfileDao};
pub use photo_dao::PhotoDao;
pub use product_dao::ProductDao;
pub use time_provider::{FixedTimeProvider, SystemTimeProvider, TimeProvider};
