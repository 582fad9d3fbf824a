use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::model::employee::{Employee, EmployeeChanges, NewEmployee};
use crate::store::{StoreError, classify_write_error};
use crate::utils::db_utils::{
    SqlValue, WhereClause, build_update_sql, execute_update, sql_arguments,
};

pub const DUPLICATE_EMPLOYEE: &str = "Employee with this ID or Email already exists.";

const SEARCH_COLUMNS: [&str; 4] = ["employee_id", "full_name", "email", "department"];

const SELECT_EMPLOYEES: &str = r#"
    SELECT id, employee_id, full_name, email, department, created_at
    FROM employees
"#;

/// Employee records. Uniqueness of `employee_id` and `email` lives in the
/// schema, deletes cascade to attendance through the foreign key.
pub struct Registry<'a> {
    pool: &'a SqlitePool,
}

impl<'a> Registry<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest first.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Employee>, StoreError> {
        let mut filter = WhereClause::default();
        if let Some(search) = search {
            filter.search(&SEARCH_COLUMNS, search);
        }

        let sql = format!(
            "{} {} ORDER BY created_at DESC, id DESC",
            SELECT_EMPLOYEES,
            filter.sql()
        );
        debug!(sql = %sql, "Fetching employees");

        let query = sqlx::query_as_with::<_, Employee, _>(&sql, sql_arguments(filter.into_bindings()));
        Ok(query.fetch_all(self.pool).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Employee, StoreError> {
        fetch_employee(self.pool, id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn create(&self, new: &NewEmployee) -> Result<Employee, StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO employees (employee_id, full_name, email, department, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.employee_id.as_str())
        .bind(new.full_name.as_str())
        .bind(new.email.as_str())
        .bind(new.department.as_str())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| classify_write_error(e, DUPLICATE_EMPLOYEE, None))?;

        let employee = fetch_employee(&mut *tx, result.last_insert_rowid())
            .await?
            .ok_or(StoreError::NotFound)?;
        tx.commit().await?;

        Ok(employee)
    }

    /// Writes the given columns; `created_at` is never touched.
    pub async fn update(&self, id: i64, changes: EmployeeChanges) -> Result<Employee, StoreError> {
        let mut tx = self.pool.begin().await?;

        if let Some(update) = build_update_sql("employees", assignments(changes), "id", id) {
            debug!(sql = %update.sql, id, "Updating employee");
            let affected = execute_update(&mut *tx, update)
                .await
                .map_err(|e| classify_write_error(e, DUPLICATE_EMPLOYEE, None))?;

            if affected == 0 {
                return Err(StoreError::NotFound);
            }
        }

        let employee = fetch_employee(&mut *tx, id)
            .await?
            .ok_or(StoreError::NotFound)?;
        tx.commit().await?;

        Ok(employee)
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

async fn fetch_employee<'e, E>(executor: E, id: i64) -> Result<Option<Employee>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("{} WHERE id = ?", SELECT_EMPLOYEES);
    sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

fn assignments(changes: EmployeeChanges) -> Vec<(&'static str, SqlValue)> {
    let mut set = Vec::new();
    if let Some(v) = changes.employee_id {
        set.push(("employee_id", SqlValue::Text(v)));
    }
    if let Some(v) = changes.full_name {
        set.push(("full_name", SqlValue::Text(v)));
    }
    if let Some(v) = changes.email {
        set.push(("email", SqlValue::Text(v)));
    }
    if let Some(v) = changes.department {
        set.push(("department", SqlValue::Text(v)));
    }
    set
}
