use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::model::attendance::AttendanceStatus;
use crate::model::dashboard::{DashboardSummary, EmployeeStat};
use crate::store::StoreError;

/// Read-only aggregate over the registry and the ledger, recomputed on
/// every call.
pub struct Aggregator<'a> {
    pool: &'a SqlitePool,
}

impl<'a> Aggregator<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn summarize(&self, today: NaiveDate) -> Result<DashboardSummary, StoreError> {
        let total_employees: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
            .fetch_one(self.pool)
            .await?;

        let present_today = self.count_on(today, AttendanceStatus::Present).await?;
        let absent_today = self.count_on(today, AttendanceStatus::Absent).await?;
        let employee_stats = self.present_days_per_employee().await?;

        debug!(
            %today,
            total_employees,
            present_today,
            absent_today,
            "Dashboard computed"
        );

        Ok(DashboardSummary {
            total_employees,
            present_today,
            absent_today,
            employee_stats,
        })
    }

    async fn count_on(&self, date: NaiveDate, status: AttendanceStatus) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendances WHERE date = ? AND status = ?")
            .bind(date)
            .bind(status.as_ref())
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Every employee, including those with no present days.
    async fn present_days_per_employee(&self) -> Result<Vec<EmployeeStat>, StoreError> {
        let stats = sqlx::query_as::<_, EmployeeStat>(
            r#"
            SELECT
                e.employee_id,
                e.full_name,
                e.department,
                COUNT(a.id) AS total_present
            FROM employees e
            LEFT JOIN attendances a
                ON a.employee_id = e.id AND a.status = ?
            GROUP BY e.id, e.employee_id, e.full_name, e.department
            ORDER BY total_present DESC, e.id ASC
            "#,
        )
        .bind(AttendanceStatus::Present.as_ref())
        .fetch_all(self.pool)
        .await?;

        Ok(stats)
    }
}
