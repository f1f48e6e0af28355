// Employee / EmployeeProfile DAO Ports (Interfaces)

use crate::domain::{Employee, EmployeeId, EmployeeProfile, EmployeeWithProfile};
use crate::error::Result;
use crate::port::CrudDao;
use async_trait::async_trait;

#[async_trait]
pub trait EmployeeDao: CrudDao<Employee> {
    /// Load an employee and its profile (if any) in one read-only transaction
    async fn find_by_id_fetch_profile(&self, id: EmployeeId) -> Result<EmployeeWithProfile>;
}

/// Profiles borrow their identity from the employee they describe
#[async_trait]
pub trait EmployeeProfileDao: Send + Sync {
    /// Insert the profile under the employee's id (the employee must be persisted)
    async fn save(&self, employee: &Employee, profile: &mut EmployeeProfile) -> Result<()>;

    async fn find_one(&self, employee_id: EmployeeId) -> Result<EmployeeProfile>;

    async fn update(&self, profile: &EmployeeProfile) -> Result<()>;

    async fn remove(&self, profile: &EmployeeProfile) -> Result<()>;
}
