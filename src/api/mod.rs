pub mod attendance;
pub mod dashboard;
pub mod employee;

use actix_web::{HttpRequest, HttpResponse};
use serde_json::json;

/// Links to every collection under the API prefix.
#[utoipa::path(
    get,
    path = "/api",
    responses(
        (status = 200, description = "Resource links", body = Object, example = json!({
            "employees": "http://127.0.0.1:8000/api/employees/",
            "attendances": "http://127.0.0.1:8000/api/attendances/",
            "dashboard": "http://127.0.0.1:8000/api/dashboard/"
        }))
    ),
    tag = "Root"
)]
pub async fn api_root(req: HttpRequest) -> HttpResponse {
    let conn = req.connection_info();
    let base = format!(
        "{}://{}{}",
        conn.scheme(),
        conn.host(),
        req.path().trim_end_matches('/')
    );

    HttpResponse::Ok().json(json!({
        "employees": format!("{}/employees/", base),
        "attendances": format!("{}/attendances/", base),
        "dashboard": format!("{}/dashboard/", base),
    }))
}
