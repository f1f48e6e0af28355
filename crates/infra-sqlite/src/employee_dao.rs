// SQLite EmployeeDao / EmployeeProfileDao Implementations

use crate::error::map_sqlx_error;
use crate::TxExecutor;
use async_trait::async_trait;
use daokit_core::domain::{
    require_id, Employee, EmployeeId, EmployeeProfile, EmployeeWithProfile, Entity,
};
use daokit_core::error::{DaoError, Result};
use daokit_core::port::{CrudDao, EmployeeDao, EmployeeProfileDao};
use sqlx::{SqliteConnection, SqlitePool};

pub struct SqliteEmployeeDao {
    executor: TxExecutor,
}

impl SqliteEmployeeDao {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            executor: TxExecutor::new(pool),
        }
    }
}

#[async_trait]
impl CrudDao<Employee> for SqliteEmployeeDao {
    async fn save(&self, employee: &mut Employee) -> Result<()> {
        employee.validate()?;
        let row = employee.clone();

        let id = self
            .executor
            .perform_within_tx("Error saving employee", move |conn| {
                Box::pin(async move {
                    let done =
                        sqlx::query("INSERT INTO employee (first_name, last_name) VALUES (?, ?)")
                            .bind(&row.first_name)
                            .bind(&row.last_name)
                            .execute(conn)
                            .await
                            .map_err(map_sqlx_error)?;
                    Ok(done.last_insert_rowid())
                })
            })
            .await?;

        employee.id = Some(id);
        Ok(())
    }

    async fn find_one(&self, id: EmployeeId) -> Result<Employee> {
        self.executor
            .read_within_tx("Error finding employee by id", move |conn| {
                Box::pin(async move { select_employee(conn, id).await })
            })
            .await
    }

    async fn find_all(&self) -> Result<Vec<Employee>> {
        self.executor
            .read_within_tx("Error finding all employees", |conn| {
                Box::pin(async move {
                    let rows: Vec<EmployeeRow> = sqlx::query_as(
                        "SELECT id, first_name, last_name FROM employee ORDER BY id ASC",
                    )
                    .fetch_all(conn)
                    .await
                    .map_err(map_sqlx_error)?;
                    Ok(rows.into_iter().map(EmployeeRow::into_employee).collect())
                })
            })
            .await
    }

    async fn update(&self, employee: &Employee) -> Result<()> {
        let id = require_id(employee, "update")?;
        employee.validate()?;
        let row = employee.clone();

        self.executor
            .perform_within_tx("Error updating employee", move |conn| {
                Box::pin(async move {
                    let done =
                        sqlx::query("UPDATE employee SET first_name = ?, last_name = ? WHERE id = ?")
                            .bind(&row.first_name)
                            .bind(&row.last_name)
                            .bind(id)
                            .execute(conn)
                            .await
                            .map_err(map_sqlx_error)?;
                    if done.rows_affected() == 0 {
                        return Err(DaoError::not_found(Employee::NAME, id));
                    }
                    Ok(())
                })
            })
            .await
    }

    /// Delete the employee and, in the same transaction, its profile
    async fn remove(&self, employee: &Employee) -> Result<()> {
        let id = require_id(employee, "remove")?;

        self.executor
            .perform_within_tx("Error removing employee", move |conn| {
                Box::pin(async move {
                    sqlx::query("DELETE FROM employee_profile WHERE employee_id = ?")
                        .bind(id)
                        .execute(&mut *conn)
                        .await
                        .map_err(map_sqlx_error)?;
                    sqlx::query("DELETE FROM employee WHERE id = ?")
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
impl EmployeeDao for SqliteEmployeeDao {
    async fn find_by_id_fetch_profile(&self, id: EmployeeId) -> Result<EmployeeWithProfile> {
        self.executor
            .read_within_tx("Error finding employee with profile", move |conn| {
                Box::pin(async move {
                    let employee = select_employee(&mut *conn, id).await?;
                    let profile = select_profile(conn, id).await?;
                    Ok(EmployeeWithProfile { employee, profile })
                })
            })
            .await
    }
}

pub struct SqliteEmployeeProfileDao {
    executor: TxExecutor,
}

impl SqliteEmployeeProfileDao {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            executor: TxExecutor::new(pool),
        }
    }
}

#[async_trait]
impl EmployeeProfileDao for SqliteEmployeeProfileDao {
    /// The profile's id is copied from the employee, never generated
    async fn save(&self, employee: &Employee, profile: &mut EmployeeProfile) -> Result<()> {
        let employee_id = require_id(employee, "save profile of")?;
        profile.validate()?;
        let row = profile.clone();

        self.executor
            .perform_within_tx("Error saving employee profile", move |conn| {
                Box::pin(async move {
                    sqlx::query(
                        "INSERT INTO employee_profile (employee_id, position, department) \
                         VALUES (?, ?, ?)",
                    )
                    .bind(employee_id)
                    .bind(&row.position)
                    .bind(&row.department)
                    .execute(conn)
                    .await
                    .map_err(map_sqlx_error)?;
                    Ok(())
                })
            })
            .await?;

        profile.id = Some(employee_id);
        Ok(())
    }

    async fn find_one(&self, employee_id: EmployeeId) -> Result<EmployeeProfile> {
        self.executor
            .read_within_tx("Error finding employee profile", move |conn| {
                Box::pin(async move {
                    select_profile(conn, employee_id)
                        .await?
                        .ok_or_else(|| DaoError::not_found(EmployeeProfile::NAME, employee_id))
                })
            })
            .await
    }

    async fn update(&self, profile: &EmployeeProfile) -> Result<()> {
        let id = require_id(profile, "update")?;
        profile.validate()?;
        let row = profile.clone();

        self.executor
            .perform_within_tx("Error updating employee profile", move |conn| {
                Box::pin(async move {
                    let done = sqlx::query(
                        "UPDATE employee_profile SET position = ?, department = ? \
                         WHERE employee_id = ?",
                    )
                    .bind(&row.position)
                    .bind(&row.department)
                    .bind(id)
                    .execute(conn)
                    .await
                    .map_err(map_sqlx_error)?;
                    if done.rows_affected() == 0 {
                        return Err(DaoError::not_found(EmployeeProfile::NAME, id));
                    }
                    Ok(())
                })
            })
            .await
    }

    async fn remove(&self, profile: &EmployeeProfile) -> Result<()> {
        let id = require_id(profile, "remove")?;

        self.executor
            .perform_within_tx("Error removing employee profile", move |conn| {
                Box::pin(async move {
                    sqlx::query("DELETE FROM employee_profile WHERE employee_id = ?")
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

async fn select_employee(conn: &mut SqliteConnection, id: EmployeeId) -> Result<Employee> {
    let row: Option<EmployeeRow> =
        sqlx::query_as("SELECT id, first_name, last_name FROM employee WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(map_sqlx_error)?;

    row.map(EmployeeRow::into_employee)
        .ok_or_else(|| DaoError::not_found(Employee::NAME, id))
}

async fn select_profile(
    conn: &mut SqliteConnection,
    employee_id: EmployeeId,
) -> Result<Option<EmployeeProfile>> {
    let row: Option<ProfileRow> = sqlx::query_as(
        "SELECT employee_id, position, department FROM employee_profile WHERE employee_id = ?",
    )
    .bind(employee_id)
    .fetch_optional(conn)
    .await
    .map_err(map_sqlx_error)?;

    Ok(row.map(ProfileRow::into_profile))
}

#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    id: i64,
    first_name: String,
    last_name: String,
}

impl EmployeeRow {
    fn into_employee(self) -> Employee {
        Employee {
            id: Some(self.id),
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    employee_id: i64,
    position: String,
    department: String,
}

impl ProfileRow {
    fn into_profile(self) -> EmployeeProfile {
        EmployeeProfile {
            id: Some(self.employee_id),
            position: self.position,
            department: self.department,
        }
    }
}
