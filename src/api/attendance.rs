use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::model::attendance::{AttendanceFilter, AttendancePayload};
use crate::model::validation::{INVALID_DATE, parse_date};
use crate::store::Ledger;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// Internal employee ID
    #[schema(example = "1")]
    pub employee_id: Option<String>,
    /// Exact date, YYYY-MM-DD
    #[schema(example = "2026-01-02")]
    pub date: Option<String>,
    /// Matches employee name, employee ID, date or status (case-insensitive)
    #[schema(example = "present")]
    pub search: Option<String>,
}

impl AttendanceQuery {
    /// Blank values are ignored, anything else has to parse.
    fn into_filter(self) -> Result<AttendanceFilter, ApiError> {
        let employee_id = match non_blank(self.employee_id) {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| ApiError::BadRequest("employee_id must be an integer.".to_string()))?,
            ),
            None => None,
        };

        let date = match non_blank(self.date) {
            Some(raw) => Some(parse_date(&raw).ok_or_else(|| ApiError::BadRequest(INVALID_DATE.to_string()))?),
            None => None,
        };

        Ok(AttendanceFilter {
            employee_id,
            date,
            search: non_blank(self.search),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// -------------------- Handlers --------------------

/// List attendance records, newest date first
#[utoipa::path(
    get,
    path = "/api/attendances",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance list", body = [crate::model::attendance::Attendance]),
        (status = 400, description = "Malformed filter", body = Object, example = json!({
            "detail": "Date has wrong format. Use one of these formats instead: YYYY-MM-DD."
        }))
    ),
    tag = "Attendance"
)]
pub async fn list_attendances(
    pool: web::Data<SqlitePool>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = query.into_inner().into_filter()?;

    let records = Ledger::new(pool.get_ref()).list(&filter).await?;
    debug!(count = records.len(), "Listed attendances");

    Ok(HttpResponse::Ok().json(records))
}

/// Mark attendance for one employee on one day
#[utoipa::path(
    post,
    path = "/api/attendances",
    request_body = AttendancePayload,
    responses(
        (status = 201, description = "Attendance recorded", body = crate::model::attendance::Attendance),
        (status = 400, description = "Invalid fields or already marked for that day", body = Object, example = json!({
            "detail": "Attendance record for this employee on this date already exists."
        }))
    ),
    tag = "Attendance"
)]
pub async fn create_attendance(
    pool: web::Data<SqlitePool>,
    payload: web::Json<AttendancePayload>,
) -> Result<HttpResponse, ApiError> {
    let new = payload.into_inner().into_new()?;

    let record = Ledger::new(pool.get_ref()).create(&new).await?;
    info!(
        id = record.id,
        employee_id = record.employee_id,
        date = %record.date,
        status = %record.status,
        "Attendance recorded"
    );

    Ok(HttpResponse::Created().json(record))
}

/// Get attendance record by ID
#[utoipa::path(
    get,
    path = "/api/attendances/{id}",
    params(
        ("id", Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Attendance found", body = crate::model::attendance::Attendance),
        (status = 404, description = "Attendance not found", body = Object, example = json!({
            "detail": "Not found."
        }))
    ),
    tag = "Attendance"
)]
pub async fn get_attendance(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let record = Ledger::new(pool.get_ref()).get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Replace attendance record (every field required)
#[utoipa::path(
    put,
    path = "/api/attendances/{id}",
    params(
        ("id", Path, description = "Attendance record ID")
    ),
    request_body = AttendancePayload,
    responses(
        (status = 200, description = "Attendance replaced", body = crate::model::attendance::Attendance),
        (status = 400, description = "Invalid fields or already marked for that day"),
        (status = 404, description = "Attendance not found")
    ),
    tag = "Attendance"
)]
pub async fn replace_attendance(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<AttendancePayload>,
) -> Result<HttpResponse, ApiError> {
    update(pool, path.into_inner(), payload.into_inner(), false).await
}

/// Partially update attendance record
#[utoipa::path(
    patch,
    path = "/api/attendances/{id}",
    params(
        ("id", Path, description = "Attendance record ID")
    ),
    request_body = AttendancePayload,
    responses(
        (status = 200, description = "Attendance updated", body = crate::model::attendance::Attendance),
        (status = 400, description = "Invalid fields or already marked for that day"),
        (status = 404, description = "Attendance not found")
    ),
    tag = "Attendance"
)]
pub async fn patch_attendance(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<AttendancePayload>,
) -> Result<HttpResponse, ApiError> {
    update(pool, path.into_inner(), payload.into_inner(), true).await
}

async fn update(
    pool: web::Data<SqlitePool>,
    id: i64,
    payload: AttendancePayload,
    partial: bool,
) -> Result<HttpResponse, ApiError> {
    let ledger = Ledger::new(pool.get_ref());
    // unknown ids are 404 whatever the payload holds
    ledger.get(id).await?;
    let changes = payload.into_changes(partial)?;

    let record = ledger.update(id, changes).await?;
    info!(id, partial, "Attendance updated");

    Ok(HttpResponse::Ok().json(record))
}

/// Delete attendance record
#[utoipa::path(
    delete,
    path = "/api/attendances/{id}",
    params(
        ("id", Path, description = "Attendance record ID")
    ),
    responses(
        (status = 204, description = "Successfully deleted"),
        (status = 404, description = "Attendance not found")
    ),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    Ledger::new(pool.get_ref()).delete(id).await?;
    info!(id, "Attendance deleted");

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use crate::db::test_pool;
    use crate::routes::test_app;

    macro_rules! create_employee {
        ($app:expr, $code:expr, $name:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/employees")
                .set_json(json!({
                    "employee_id": $code,
                    "full_name": $name,
                    "email": format!("{}@example.com", $code),
                    "department": "Engineering"
                }))
                .to_request();
            let body: Value = test::call_and_read_body_json(&$app, req).await;
            body["id"].as_i64().unwrap()
        }};
    }

    #[actix_web::test]
    async fn second_mark_for_same_day_is_rejected() {
        let pool = test_pool().await;
        let app = test_app!(pool);
        let id = create_employee!(app, "EMP-001", "Ada Lovelace");

        let mark = |date: &str, status: &str| {
            test::TestRequest::post()
                .uri("/api/attendances/")
                .set_json(json!({"employee_id": id, "date": date, "status": status}))
                .to_request()
        };

        let resp = test::call_service(&app, mark("2026-10-01", "Present")).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["employee_id"], id);
        assert_eq!(created["employee_details"]["full_name"], "Ada Lovelace");
        assert_eq!(created["date"], "2026-10-01");

        let resp = test::call_service(&app, mark("2026-10-01", "Absent")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({"detail": "Attendance record for this employee on this date already exists."})
        );

        let resp = test::call_service(&app, mark("2026-10-02", "Absent")).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn employee_reference_is_validated() {
        let pool = test_pool().await;
        let app = test_app!(pool);

        let req = test::TestRequest::post()
            .uri("/api/attendances")
            .set_json(json!({"employee_id": "77", "date": "2026-10-01", "status": "Present"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({"employee_id": ["Invalid pk \"77\" - object does not exist."]})
        );

        let req = test::TestRequest::post()
            .uri("/api/attendances")
            .set_json(json!({"date": "01-10-2026"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["employee_id"], json!(["This field is required."]));
        assert_eq!(
            body["date"],
            json!(["Date has wrong format. Use one of these formats instead: YYYY-MM-DD."])
        );
        assert_eq!(body["status"], json!(["This field is required."]));
    }

    #[actix_web::test]
    async fn wrong_json_types_are_field_errors() {
        let pool = test_pool().await;
        let app = test_app!(pool);
        let ada = create_employee!(app, "EMP-001", "Ada Lovelace");

        let req = test::TestRequest::post()
            .uri("/api/attendances")
            .set_json(json!({"employee_id": ada, "date": 20261001, "status": ["Present"]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({
                "date": ["Date has wrong format. Use one of these formats instead: YYYY-MM-DD."],
                "status": ["Not a valid string."]
            })
        );

        let req = test::TestRequest::post()
            .uri("/api/attendances")
            .set_json(json!({"employee_id": null, "date": "2026-10-01", "status": "Present"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"employee_id": ["This field may not be null."]}));
    }

    #[actix_web::test]
    async fn unknown_record_is_not_found_before_payload_checks() {
        let pool = test_pool().await;
        let app = test_app!(pool);

        for req in [
            test::TestRequest::patch()
                .uri("/api/attendances/999")
                .set_json(json!({"date": "tomorrow"}))
                .to_request(),
            test::TestRequest::put()
                .uri("/api/attendances/999")
                .set_json(json!({}))
                .to_request(),
        ] {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body, json!({"detail": "Not found."}));
        }
    }

    #[actix_web::test]
    async fn search_matches_non_ascii_employee_names() {
        let pool = test_pool().await;
        let app = test_app!(pool);
        let elodie = create_employee!(app, "EMP-001", "Élodie Dupont");
        let ada = create_employee!(app, "EMP-002", "Ada Lovelace");

        for employee in [elodie, ada] {
            let req = test::TestRequest::post()
                .uri("/api/attendances")
                .set_json(json!({"employee_id": employee, "date": "2026-10-01", "status": "Present"}))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        // Élodie
        let req = test::TestRequest::get()
            .uri("/api/attendances?search=%C3%89lodie")
            .to_request();
        let found: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        assert_eq!(found[0]["employee_id"], elodie);
    }

    #[actix_web::test]
    async fn list_filters_by_employee_date_and_search() {
        let pool = test_pool().await;
        let app = test_app!(pool);
        let ada = create_employee!(app, "EMP-001", "Ada Lovelace");
        let alan = create_employee!(app, "EMP-002", "Alan Turing");

        for (employee, date, status) in [
            (ada, "2026-10-01", "Present"),
            (ada, "2026-10-02", "Absent"),
            (alan, "2026-10-02", "Present"),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/attendances")
                .set_json(json!({"employee_id": employee, "date": date, "status": status}))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let list = |uri: String| test::TestRequest::get().uri(&uri).to_request();

        let all: Value = test::call_and_read_body_json(&app, list("/api/attendances".into())).await;
        assert_eq!(all.as_array().unwrap().len(), 3);
        assert_eq!(all[2]["date"], "2026-10-01");

        let ada_only: Value = test::call_and_read_body_json(
            &app,
            list(format!("/api/attendances?employee_id={}&date=&search=", ada)),
        )
        .await;
        assert_eq!(ada_only.as_array().unwrap().len(), 2);

        let on_day: Value =
            test::call_and_read_body_json(&app, list("/api/attendances?date=2026-10-02".into())).await;
        assert_eq!(on_day.as_array().unwrap().len(), 2);

        let searched: Value =
            test::call_and_read_body_json(&app, list("/api/attendances?search=turing".into())).await;
        assert_eq!(searched.as_array().unwrap().len(), 1);
        assert_eq!(searched[0]["employee_details"]["employee_id"], "EMP-002");

        let resp = test::call_service(&app, list("/api/attendances?date=yesterday".into())).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn deleting_employee_removes_their_attendance() {
        let pool = test_pool().await;
        let app = test_app!(pool);
        let ada = create_employee!(app, "EMP-001", "Ada Lovelace");

        let req = test::TestRequest::post()
            .uri("/api/attendances")
            .set_json(json!({"employee_id": ada, "date": "2026-10-01", "status": "Present"}))
            .to_request();
        let record: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/api/employees/{}", ada))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri(&format!("/api/attendances?employee_id={}", ada))
            .to_request();
        let remaining: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(remaining, json!([]));

        let req = test::TestRequest::get()
            .uri(&format!("/api/attendances/{}", record["id"]))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn patch_changes_status_only() {
        let pool = test_pool().await;
        let app = test_app!(pool);
        let ada = create_employee!(app, "EMP-001", "Ada Lovelace");

        let req = test::TestRequest::post()
            .uri("/api/attendances")
            .set_json(json!({"employee_id": ada, "date": "2026-10-01", "status": "Present"}))
            .to_request();
        let record: Value = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/api/attendances/{}", record["id"]);

        let req = test::TestRequest::patch()
            .uri(&uri)
            .set_json(json!({"status": "Absent"}))
            .to_request();
        let patched: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(patched["status"], "Absent");
        assert_eq!(patched["date"], "2026-10-01");
        assert_eq!(patched["created_at"], record["created_at"]);

        let req = test::TestRequest::delete().uri(&uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    }
}
