// Domain Layer - Persisted entities and their in-memory invariants

pub mod account;
pub mod company;
pub mod employee;
pub mod entity;
pub mod photo;
pub mod product;

// Re-exports
pub use account::{Account, AccountId, Gender};
pub use company::{Company, CompanyId, CompanyWithProducts};
pub use employee::{Employee, EmployeeId, EmployeeProfile, EmployeeWithProfile};
pub use entity::{require_id, Entity};
pub use photo::{Photo, PhotoComment, PhotoCommentId, PhotoId};
pub use product::{Product, ProductId, ProductWithCompany};
