use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::model::employee::EmployeePayload;
use crate::store::Registry;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    /// Matches employee id, name, email or department (case-insensitive)
    #[schema(example = "engineering")]
    pub search: Option<String>,
}

// -------------------- Handlers --------------------

/// List employees, newest first
#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Employee list", body = [crate::model::employee::Employee])
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<SqlitePool>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, ApiError> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let employees = Registry::new(pool.get_ref()).list(search).await?;
    debug!(count = employees.len(), search = ?search, "Listed employees");

    Ok(HttpResponse::Ok().json(employees))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = EmployeePayload,
    responses(
        (status = 201, description = "Employee created", body = crate::model::employee::Employee),
        (status = 400, description = "Invalid fields or duplicate employee", body = Object, example = json!({
            "detail": "Employee with this ID or Email already exists."
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<SqlitePool>,
    payload: web::Json<EmployeePayload>,
) -> Result<HttpResponse, ApiError> {
    let new = payload.into_inner().into_new()?;

    let employee = Registry::new(pool.get_ref()).create(&new).await?;
    info!(id = employee.id, employee_id = %employee.employee_id, "Employee created");

    Ok(HttpResponse::Created().json(employee))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(
        ("id", Path, description = "Internal employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = crate::model::employee::Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "detail": "Not found."
        }))
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let employee = Registry::new(pool.get_ref()).get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Replace Employee (every field required)
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(
        ("id", Path, description = "Internal employee ID")
    ),
    request_body = EmployeePayload,
    responses(
        (status = 200, description = "Employee replaced", body = crate::model::employee::Employee),
        (status = 400, description = "Invalid fields or duplicate employee"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn replace_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<EmployeePayload>,
) -> Result<HttpResponse, ApiError> {
    update(pool, path.into_inner(), payload.into_inner(), false).await
}

/// Partially update Employee
#[utoipa::path(
    patch,
    path = "/api/employees/{id}",
    params(
        ("id", Path, description = "Internal employee ID")
    ),
    request_body = EmployeePayload,
    responses(
        (status = 200, description = "Employee updated", body = crate::model::employee::Employee),
        (status = 400, description = "Invalid fields or duplicate employee"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn patch_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<EmployeePayload>,
) -> Result<HttpResponse, ApiError> {
    update(pool, path.into_inner(), payload.into_inner(), true).await
}

async fn update(
    pool: web::Data<SqlitePool>,
    id: i64,
    payload: EmployeePayload,
    partial: bool,
) -> Result<HttpResponse, ApiError> {
    let registry = Registry::new(pool.get_ref());
    // unknown ids are 404 whatever the payload holds
    registry.get(id).await?;
    let changes = payload.into_changes(partial)?;

    let employee = registry.update(id, changes).await?;
    info!(id, partial, "Employee updated");

    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee together with its attendance records
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(
        ("id", Path, description = "Internal employee ID")
    ),
    responses(
        (status = 204, description = "Successfully deleted"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "detail": "Not found."
        }))
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    Registry::new(pool.get_ref()).delete(id).await?;
    info!(id, "Employee deleted");

    Ok(HttpResponse::NoContent().finish())
}
