use crate::api::attendance::AttendanceQuery;
use crate::api::employee::EmployeeQuery;
use crate::model::attendance::{Attendance, AttendancePayload};
use crate::model::dashboard::{DashboardSummary, EmployeeStat};
use crate::model::employee::{Employee, EmployeePayload};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS Lite API",
        version = "0.1.0",
        description = r#"
## HRMS Lite

A small **Human Resource Management** backend: employee records, daily
attendance and a dashboard snapshot.

### Key Features
- **Employees**
  - Create, replace, patch, list (with search), view and delete employee records
  - `employee_id` and `email` are unique
- **Attendance**
  - One record per employee per day, filterable by employee, date and search term
  - Deleting an employee deletes their attendance
- **Dashboard**
  - Present / absent counts for today and present days per employee

### Errors
- `400` with `{"detail": "..."}` for duplicates and malformed input
- `400` with `{"field": ["message"]}` for invalid fields
- `404` with `{"detail": "Not found."}`

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::api_root,

        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::replace_employee,
        crate::api::employee::patch_employee,
        crate::api::employee::delete_employee,

        crate::api::attendance::list_attendances,
        crate::api::attendance::create_attendance,
        crate::api::attendance::get_attendance,
        crate::api::attendance::replace_attendance,
        crate::api::attendance::patch_attendance,
        crate::api::attendance::delete_attendance,

        crate::api::dashboard::dashboard
    ),
    components(
        schemas(
            Employee,
            EmployeePayload,
            EmployeeQuery,
            Attendance,
            AttendancePayload,
            AttendanceQuery,
            DashboardSummary,
            EmployeeStat
        )
    ),
    tags(
        (name = "Root", description = "API root"),
        (name = "Employee", description = "Employee registry APIs"),
        (name = "Attendance", description = "Attendance ledger APIs"),
        (name = "Dashboard", description = "Aggregate dashboard"),
    )
)]
pub struct ApiDoc;
