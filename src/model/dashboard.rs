use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeStat {
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    #[schema(example = "John Doe")]
    pub full_name: String,
    #[schema(example = "Engineering")]
    pub department: String,
    /// Lifetime count of `Present` attendance rows
    #[schema(example = 12)]
    pub total_present: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardSummary {
    #[schema(example = 25)]
    pub total_employees: i64,
    #[schema(example = 20)]
    pub present_today: i64,
    #[schema(example = 3)]
    pub absent_today: i64,
    pub employee_stats: Vec<EmployeeStat>,
}
