// Employee / EmployeeProfile Domain Model

use serde::{Deserialize, Serialize};

use super::entity::{require_text, Entity};
use crate::error::Result;

/// Employee ID (generated on insert, shared by the profile)
pub type EmployeeId = i64;

/// Employee Entity (table `employee`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Option<EmployeeId>,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text(Self::NAME, "first_name", &self.first_name)?;
        require_text(Self::NAME, "last_name", &self.last_name)
    }
}

impl Entity for Employee {
    const NAME: &'static str = "Employee";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

/// EmployeeProfile Entity (table `employee_profile`)
///
/// Has no id sequence of its own: `id` is the owning employee's id, stored in
/// the `employee_id` column which is both primary and foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub id: Option<EmployeeId>,
    pub position: String,
    pub department: String,
}

impl EmployeeProfile {
    pub fn new(position: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            id: None,
            position: position.into(),
            department: department.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text(Self::NAME, "position", &self.position)?;
        require_text(Self::NAME, "department", &self.department)
    }
}

impl Entity for EmployeeProfile {
    const NAME: &'static str = "EmployeeProfile";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

/// Employee loaded together with its profile, if one exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeWithProfile {
    pub employee: Employee,
    pub profile: Option<EmployeeProfile>,
}
