use crate::{
    api::{self, attendance, dashboard, employee},
    error,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use anyhow::{Context, Result};

pub type ApiRateLimit = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Peer-IP rate limit allowing `requests_per_min` with a matching burst.
pub fn build_rate_limit(requests_per_min: u32) -> Result<ApiRateLimit> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };

    GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms.max(1))
        .burst_size(requests_per_min.max(1))
        .finish()
        .context("Invalid rate limit configuration")
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, rate_limit: &ApiRateLimit) {
    cfg.service(
        web::scope(api_prefix)
            .wrap(Governor::new(rate_limit)) // rate limiting
            .configure(api_routes),
    );
}

/// Every API resource, relative to the prefix scope.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
        .app_data(error::path_config())
        // /api
        .service(web::resource("").route(web::get().to(api::api_root)))
        .service(
            web::scope("/employees")
                // /employees
                .service(
                    web::resource("")
                        .route(web::get().to(employee::list_employees))
                        .route(web::post().to(employee::create_employee)),
                )
                // /employees/{id}
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(employee::get_employee))
                        .route(web::put().to(employee::replace_employee))
                        .route(web::patch().to(employee::patch_employee))
                        .route(web::delete().to(employee::delete_employee)),
                ),
        )
        .service(
            web::scope("/attendances")
                // /attendances
                .service(
                    web::resource("")
                        .route(web::get().to(attendance::list_attendances))
                        .route(web::post().to(attendance::create_attendance)),
                )
                // /attendances/{id}
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(attendance::get_attendance))
                        .route(web::put().to(attendance::replace_attendance))
                        .route(web::patch().to(attendance::patch_attendance))
                        .route(web::delete().to(attendance::delete_attendance)),
                ),
        )
        // /dashboard
        .service(web::resource("/dashboard").route(web::get().to(dashboard::dashboard)));
}

/// Service with the API mounted at `/api`, without rate limiting (test
/// requests carry no peer address).
#[cfg(test)]
macro_rules! test_app {
    ($pool:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_web::middleware::NormalizePath::trim())
                .app_data(actix_web::web::Data::new($pool.clone()))
                .service(actix_web::web::scope("/api").configure(crate::routes::api_routes)),
        )
        .await
    };
}

#[cfg(test)]
pub(crate) use test_app;
