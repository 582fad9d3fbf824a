use actix_web::{HttpResponse, web};
use chrono::Local;
use sqlx::SqlitePool;

use crate::error::ApiError;
use crate::store::Aggregator;

/// Today's presence counts and per-employee present days
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Aggregate snapshot, recomputed per request", body = crate::model::dashboard::DashboardSummary)
    ),
    tag = "Dashboard"
)]
pub async fn dashboard(pool: web::Data<SqlitePool>) -> Result<HttpResponse, ApiError> {
    let today = Local::now().date_naive();
    let summary = Aggregator::new(pool.get_ref()).summarize(today).await?;

    Ok(HttpResponse::Ok().json(summary))
}
