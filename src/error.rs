use std::collections::BTreeMap;

use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use derive_more::Display;
use serde_json::json;
use tracing::{debug, error};

use crate::store::StoreError;

/// Field name -> messages, serialized as `{"email": ["Enter a valid email address."]}`.
pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "Invalid input: {:?}", _0)]
    Validation(FieldErrors),

    #[display(fmt = "{}", _0)]
    BadRequest(String),

    #[display(fmt = "Not found.")]
    NotFound,

    #[display(fmt = "Database error: {}", _0)]
    Database(sqlx::Error),
}

impl ApiError {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field, vec![message.into()]);
        ApiError::Validation(errors)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(detail) => ApiError::BadRequest(detail.to_string()),
            StoreError::NotFound => ApiError::NotFound,
            StoreError::MissingEmployee(pk) => ApiError::field(
                "employee_id",
                format!("Invalid pk \"{}\" - object does not exist.", pk),
            ),
            StoreError::Database(e) => ApiError::Database(e),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(errors) => {
                debug!(errors = ?errors, "Rejected invalid input");
                HttpResponse::BadRequest().json(errors)
            }
            ApiError::Database(e) => {
                // the store error stays in the log, the client gets a generic message
                error!(error = %e, "Database failure");
                HttpResponse::InternalServerError().json(json!({
                    "detail": "Internal server error"
                }))
            }
            other => {
                debug!(detail = %other, "Rejected request");
                HttpResponse::build(other.status_code()).json(json!({
                    "detail": other.to_string()
                }))
            }
        }
    }
}

// -------------------- Extractor error handlers --------------------

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        ApiError::BadRequest(format!("JSON parse error - {}", err)).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| {
        ApiError::BadRequest(format!("Invalid query string - {}", err)).into()
    })
}

/// Non-numeric ids never match a row.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err, _req: &HttpRequest| ApiError::NotFound.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn duplicate_becomes_bad_request_with_detail() {
        let err = ApiError::from(StoreError::Duplicate("already there"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"detail": "already there"}));
    }

    #[actix_web::test]
    async fn missing_employee_is_a_field_error() {
        let err = ApiError::from(StoreError::MissingEmployee(42));

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            json!({"employee_id": ["Invalid pk \"42\" - object does not exist."]})
        );
    }

    #[actix_web::test]
    async fn database_errors_do_not_leak() {
        let err = ApiError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"detail": "Internal server error"}));
    }
}
