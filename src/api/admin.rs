//! Admin endpoint handlers.
//!
//! Every handler resolves the caller from their bearer token first; the
//! service then enforces the ADMIN role, so an expired token reads as 401
//! and an insufficient role as 403.

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::handlers::bearer_token;
use crate::api::response::ApiResponse;
use crate::auth::{
    errors::AuthError,
    types::{AccountView, DecisionRequest, EscalationRequest, Role},
    AuthService,
};

pub async fn pending_approvals(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<AccountView>>>, AuthError> {
    let caller = service.authenticate(bearer_token(&headers)?).await?;
    let pending = service.list_pending_approvals(&caller).await?;
    let views: Vec<AccountView> = pending.into_iter().map(AccountView::from).collect();
    Ok(Json(ApiResponse::ok_with_message(
        views,
        "Pending approvals retrieved successfully",
    )))
}

pub async fn decide_approval(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<ApiResponse<AccountView>>, AuthError> {
    let caller = service.authenticate(bearer_token(&headers)?).await?;
    let account = service.decide_approval(&caller, &req).await?;
    let message = if req.approved {
        "User approved successfully"
    } else {
        "User rejected successfully"
    };
    Ok(Json(ApiResponse::ok_with_message(AccountView::from(account), message)))
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: String,
}

/// Direct role override, bypassing the approval workflow.
pub async fn update_role(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
    Path(account_id): Path<String>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<ApiResponse<AccountView>>, AuthError> {
    let caller = service.authenticate(bearer_token(&headers)?).await?;
    let role = Role::parse(&query.role)
        .ok_or_else(|| AuthError::Validation(format!("Invalid role: {}", query.role)))?;
    let account = service.set_role(&caller, &account_id, role).await?;
    Ok(Json(ApiResponse::ok_with_message(
        AccountView::from(account),
        "User role updated successfully",
    )))
}

/// Admin bypass registration. The account lands directly in the approved,
/// enabled SUPER_USER state.
pub async fn register_super_user(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
    Json(req): Json<EscalationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountView>>), AuthError> {
    let caller = service.authenticate(bearer_token(&headers)?).await?;
    let account = service.register_super_user_by_admin(&caller, &req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            AccountView::from(account),
            "Super user registered and approved successfully",
        )),
    ))
}
