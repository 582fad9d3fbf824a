use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use tracing::debug;

use crate::model::attendance::{
    Attendance, AttendanceChanges, AttendanceFilter, AttendanceStatus, NewAttendance,
};
use crate::model::employee::Employee;
use crate::store::{StoreError, classify_write_error};
use crate::utils::db_utils::{
    SqlValue, WhereClause, build_update_sql, execute_update, sql_arguments,
};

pub const DUPLICATE_ATTENDANCE: &str =
    "Attendance record for this employee on this date already exists.";

const SEARCH_COLUMNS: [&str; 4] = ["e.full_name", "e.employee_id", "a.date", "a.status"];

const SELECT_ATTENDANCES: &str = r#"
    SELECT
        a.id,
        a.employee_id,
        a.date,
        a.status,
        a.created_at,
        e.employee_id AS emp_employee_id,
        e.full_name AS emp_full_name,
        e.email AS emp_email,
        e.department AS emp_department,
        e.created_at AS emp_created_at
    FROM attendances a
    INNER JOIN employees e ON e.id = a.employee_id
"#;

#[derive(FromRow)]
struct AttendanceRow {
    id: i64,
    employee_id: i64,
    date: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
    emp_employee_id: String,
    emp_full_name: String,
    emp_email: String,
    emp_department: String,
    emp_created_at: DateTime<Utc>,
}

impl From<AttendanceRow> for Attendance {
    fn from(row: AttendanceRow) -> Self {
        Attendance {
            id: row.id,
            employee_id: row.employee_id,
            employee_details: Employee {
                id: row.employee_id,
                employee_id: row.emp_employee_id,
                full_name: row.emp_full_name,
                email: row.emp_email,
                department: row.emp_department,
                created_at: row.emp_created_at,
            },
            date: row.date,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// Attendance records, at most one per employee per day.
pub struct Ledger<'a> {
    pool: &'a SqlitePool,
}

impl<'a> Ledger<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest date first, then newest record.
    pub async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<Attendance>, StoreError> {
        let mut clause = WhereClause::default();
        if let Some(employee_id) = filter.employee_id {
            clause.eq("a.employee_id", SqlValue::I64(employee_id));
        }
        if let Some(date) = filter.date {
            clause.eq("a.date", SqlValue::Date(date));
        }
        if let Some(search) = filter.search.as_deref() {
            clause.search(&SEARCH_COLUMNS, search);
        }

        let sql = format!(
            "{} {} ORDER BY a.date DESC, a.created_at DESC, a.id DESC",
            SELECT_ATTENDANCES,
            clause.sql()
        );
        debug!(sql = %sql, filter = ?filter, "Fetching attendances");

        let rows = sqlx::query_as_with::<_, AttendanceRow, _>(&sql, sql_arguments(clause.into_bindings()))
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Attendance::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<Attendance, StoreError> {
        fetch_attendance(self.pool, id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn create(&self, new: &NewAttendance) -> Result<Attendance, StoreError> {
        if !AttendanceStatus::recognizes(&new.status) {
            debug!(status = %new.status, "Status is not counted by the dashboard");
        }

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO attendances (employee_id, date, status, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(new.employee_id)
        .bind(new.date)
        .bind(new.status.as_str())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| classify_write_error(e, DUPLICATE_ATTENDANCE, Some(new.employee_id)))?;

        let attendance = fetch_attendance(&mut *tx, result.last_insert_rowid())
            .await?
            .ok_or(StoreError::NotFound)?;
        tx.commit().await?;

        Ok(attendance)
    }

    pub async fn update(&self, id: i64, changes: AttendanceChanges) -> Result<Attendance, StoreError> {
        let employee_pk = changes.employee_id;
        let mut tx = self.pool.begin().await?;

        if let Some(update) = build_update_sql("attendances", assignments(changes), "id", id) {
            debug!(sql = %update.sql, id, "Updating attendance");
            let affected = execute_update(&mut *tx, update)
                .await
                .map_err(|e| classify_write_error(e, DUPLICATE_ATTENDANCE, employee_pk))?;

            if affected == 0 {
                return Err(StoreError::NotFound);
            }
        }

        let attendance = fetch_attendance(&mut *tx, id)
            .await?
            .ok_or(StoreError::NotFound)?;
        tx.commit().await?;

        Ok(attendance)
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM attendances WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

async fn fetch_attendance<'e, E>(executor: E, id: i64) -> Result<Option<Attendance>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("{} WHERE a.id = ?", SELECT_ATTENDANCES);
    let row = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(Attendance::from))
}

fn assignments(changes: AttendanceChanges) -> Vec<(&'static str, SqlValue)> {
    let mut set = Vec::new();
    if let Some(v) = changes.employee_id {
        set.push(("employee_id", SqlValue::I64(v)));
    }
    if let Some(v) = changes.date {
        set.push(("date", SqlValue::Date(v)));
    }
    if let Some(v) = changes.status {
        set.push(("status", SqlValue::Text(v)));
    }
    set
}
