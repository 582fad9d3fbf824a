use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::model::employee::Employee;
use crate::model::validation::{Validator, given};

pub const STATUS_MAX_LEN: usize = 20;

/// Statuses the dashboard counts. Stored statuses are free-form text, these
/// are just the ones with meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn recognizes(status: &str) -> bool {
        status.parse::<AttendanceStatus>().is_ok()
    }
}

/// Read shape: the raw employee reference plus a snapshot of the employee.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 10,
    "employee_id": 1,
    "employee_details": {
        "id": 1,
        "employee_id": "EMP-001",
        "full_name": "John Doe",
        "email": "john.doe@company.com",
        "department": "Engineering",
        "created_at": "2026-01-01T09:00:00Z"
    },
    "date": "2026-01-02",
    "status": "Present",
    "created_at": "2026-01-02T09:00:00Z"
}))]
pub struct Attendance {
    pub id: i64,
    pub employee_id: i64,
    pub employee_details: Employee,
    #[schema(example = "2026-01-02", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Present")]
    pub status: String,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Write shape for create, replace and partial update.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AttendancePayload {
    /// Internal id of the employee, as a number or numeric string
    #[serde(default, deserialize_with = "given")]
    #[schema(example = 1, value_type = i64)]
    pub employee_id: Option<Value>,
    #[serde(default, deserialize_with = "given")]
    #[schema(example = "2026-01-02", format = "date", value_type = String)]
    pub date: Option<Value>,
    #[serde(default, deserialize_with = "given")]
    #[schema(example = "Present", value_type = String)]
    pub status: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub employee_id: i64,
    pub date: NaiveDate,
    pub status: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AttendanceChanges {
    pub employee_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
}

impl AttendancePayload {
    pub fn into_changes(self, partial: bool) -> Result<AttendanceChanges, ApiError> {
        let mut v = Validator::new(partial);

        let changes = AttendanceChanges {
            employee_id: v.pk("employee_id", self.employee_id),
            date: v.date("date", self.date),
            status: v.text("status", self.status, STATUS_MAX_LEN),
        };

        v.finish()?;
        Ok(changes)
    }

    pub fn into_new(self) -> Result<NewAttendance, ApiError> {
        match self.into_changes(false)? {
            AttendanceChanges {
                employee_id: Some(employee_id),
                date: Some(date),
                status: Some(status),
            } => Ok(NewAttendance {
                employee_id,
                date,
                status,
            }),
            _ => Err(ApiError::BadRequest("Missing required attendance fields.".to_string())),
        }
    }
}

/// Parsed list filters. Empty query values mean "no filter".
#[derive(Debug, Default, Clone)]
pub struct AttendanceFilter {
    pub employee_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub search: Option<String>,
}
