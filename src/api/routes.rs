//! HTTP route table and middleware stack.

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::{limit::ConcurrencyLimitLayer, timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::api::{admin, handlers};
use crate::auth::AuthService;

const MAX_CONCURRENCY: usize = 256;
/// Identity payloads are small; anything larger is abuse.
const MAX_BODY_SIZE: usize = 64 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CORS_MAX_AGE: Duration = Duration::from_secs(3600);

/// Assemble the full application router around a shared [`AuthService`].
pub fn build_router(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/health", get(handlers::health))
        // registration and sessions
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/refresh", post(handlers::refresh))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/me", get(handlers::current_user))
        // escalation and federated login
        .route("/api/auth/register-super-user", post(handlers::register_super_user))
        .route("/api/auth/federated", post(handlers::federated_login))
        // admin
        .route("/api/admin/pending-approvals", get(admin::pending_approvals))
        .route("/api/admin/approve-super-user", post(admin::decide_approval))
        .route("/api/admin/users/:id/role", put(admin::update_role))
        .route("/api/admin/register-super-user", post(admin::register_super_user))
        .with_state(service)
        .layer(cors_layer())
        .layer(
            ServiceBuilder::new()
                // Convert middleware errors (timeout/overload) into HTTP responses
                .layer(HandleErrorLayer::new(|err: BoxError| async move {
                    if err.is::<tower::timeout::error::Elapsed>() {
                        (StatusCode::REQUEST_TIMEOUT, "request timed out")
                    } else {
                        (StatusCode::SERVICE_UNAVAILABLE, "service overloaded")
                    }
                }))
                .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENCY))
                .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                .layer(TraceLayer::new_for_http()),
        )
}

fn cors_layer() -> CorsLayer {
    let cors_origin = std::env::var("CORS_ALLOW_ORIGIN")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());
    tracing::info!("CORS configured to allow origin: {}", cors_origin);

    CorsLayer::new()
        .allow_origin({
            use tower_http::cors::AllowOrigin;
            if cors_origin.contains(',') {
                let list = cors_origin
                    .split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        axum::http::HeaderValue::from_str(s)
                            .expect("Invalid CORS origin in list")
                    })
                    .collect::<Vec<axum::http::HeaderValue>>();
                AllowOrigin::list(list)
            } else {
                AllowOrigin::exact(
                    axum::http::HeaderValue::from_str(&cors_origin)
                        .expect("Invalid CORS_ALLOW_ORIGIN environment variable"),
                )
            }
        })
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}
