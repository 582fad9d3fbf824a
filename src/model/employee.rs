use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::model::validation::{Validator, given};

pub const EMPLOYEE_ID_MAX_LEN: usize = 50;
pub const FULL_NAME_MAX_LEN: usize = 255;
pub const EMAIL_MAX_LEN: usize = 254;
pub const DEPARTMENT_MAX_LEN: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": "EMP-001",
        "full_name": "John Doe",
        "email": "john.doe@company.com",
        "department": "Engineering",
        "created_at": "2026-01-01T09:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[schema(example = "John Doe")]
    pub full_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Write shape for create, replace and partial update. Fields stay raw JSON
/// so type mismatches surface as field errors.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EmployeePayload {
    #[serde(default, deserialize_with = "given")]
    #[schema(example = "EMP-001", value_type = String)]
    pub employee_id: Option<Value>,
    #[serde(default, deserialize_with = "given")]
    #[schema(example = "John Doe", value_type = String)]
    pub full_name: Option<Value>,
    #[serde(default, deserialize_with = "given")]
    #[schema(example = "john@email.com", format = "email", value_type = String)]
    pub email: Option<Value>,
    #[serde(default, deserialize_with = "given")]
    #[schema(example = "Engineering", value_type = String)]
    pub department: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub employee_id: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
}

/// Validated fields to write; `None` leaves the column untouched.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EmployeeChanges {
    pub employee_id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
}

impl EmployeePayload {
    pub fn into_changes(self, partial: bool) -> Result<EmployeeChanges, ApiError> {
        let mut v = Validator::new(partial);

        let changes = EmployeeChanges {
            employee_id: v.text("employee_id", self.employee_id, EMPLOYEE_ID_MAX_LEN),
            full_name: v.text("full_name", self.full_name, FULL_NAME_MAX_LEN),
            email: v.email("email", self.email, EMAIL_MAX_LEN),
            department: v.text("department", self.department, DEPARTMENT_MAX_LEN),
        };

        v.finish()?;
        Ok(changes)
    }

    pub fn into_new(self) -> Result<NewEmployee, ApiError> {
        match self.into_changes(false)? {
            EmployeeChanges {
                employee_id: Some(employee_id),
                full_name: Some(full_name),
                email: Some(email),
                department: Some(department),
            } => Ok(NewEmployee {
                employee_id,
                full_name,
                email,
                department,
            }),
            _ => Err(ApiError::BadRequest("Missing required employee fields.".to_string())),
        }
    }
}
