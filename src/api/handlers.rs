//! Authentication endpoint handlers.
//!
//! Thin layer over [`AuthService`]: extract, delegate, wrap in the response
//! envelope. Status codes and messages live here; all decisions live in the
//! service.

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;

use crate::api::response::ApiResponse;
use crate::auth::{
    errors::AuthError,
    types::{
        AccountView, AuthResponse, EscalationRequest, FederatedAssertion, LoginRequest,
        LogoutRequest, RefreshRequest, RegisterRequest,
    },
    AuthService,
};

pub async fn register(
    State(service): State<Arc<AuthService>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AuthError> {
    let response = service.register(&req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(response, "User registered successfully")),
    ))
}

pub async fn login(
    State(service): State<Arc<AuthService>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AuthError> {
    let response = service.login(&req).await?;
    Ok(Json(ApiResponse::ok_with_message(response, "Login successful")))
}

pub async fn refresh(
    State(service): State<Arc<AuthService>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AuthError> {
    let response = service.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::ok_with_message(response, "Token refreshed successfully")))
}

/// Body is optional; a bare POST still logs out successfully.
pub async fn logout(
    State(service): State<Arc<AuthService>>,
    body: Option<Json<LogoutRequest>>,
) -> Result<Json<ApiResponse<()>>, AuthError> {
    let token = body.as_ref().and_then(|Json(req)| req.refresh_token.as_deref());
    service.logout(token).await?;
    Ok(Json(ApiResponse::message("Logout successful")))
}

pub async fn current_user(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<AccountView>>, AuthError> {
    let token = bearer_token(&headers)?;
    let account = service.authenticate(token).await?;
    Ok(Json(ApiResponse::ok_with_message(
        AccountView::from(account),
        "User information retrieved",
    )))
}

/// Self-service escalation. The created account is pending and disabled, so
/// no tokens are returned.
pub async fn register_super_user(
    State(service): State<Arc<AuthService>>,
    Json(req): Json<EscalationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountView>>), AuthError> {
    let account = service.request_escalation(&req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            AccountView::from(account),
            "Registration submitted for admin approval",
        )),
    ))
}

/// Login with a provider assertion already verified at the edge.
pub async fn federated_login(
    State(service): State<Arc<AuthService>>,
    Json(assertion): Json<FederatedAssertion>,
) -> Result<Json<ApiResponse<AuthResponse>>, AuthError> {
    let response = service.federated_login(&assertion).await?;
    Ok(Json(ApiResponse::ok_with_message(response, "Login successful")))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Pull the bearer token out of the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .ok_or_else(|| AuthError::Token("Missing or malformed Authorization header".to_string()))
}
