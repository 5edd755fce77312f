//! Error taxonomy for the identity subsystem.
//!
//! Business-rule violations are typed at the point of detection and travel
//! unchanged to the HTTP boundary, where each kind maps to a status code and
//! the shared response envelope. Storage and other unclassified failures are
//! logged in full but rendered as a single sanitized message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;
use thiserror::Error;

use crate::api::response::ApiResponse;

/// Which unique field a duplicate-resource error collided on. Duplicates are
/// reported field-specifically, unlike login failures which stay generic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Username,
    Email,
    ExternalId,
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DuplicateField::Username => "Username is already taken!",
            DuplicateField::Email => "Email is already in use!",
            DuplicateField::ExternalId => "External identity is already linked to another account",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input, rejected before any persistence attempt.
    #[error("{0}")]
    Validation(String),

    /// Unique-field collision (username/email/external id).
    #[error("{0}")]
    Duplicate(DuplicateField),

    /// Bad credentials or a non-authenticatable account. Deliberately
    /// generic: unknown username and wrong password are indistinguishable.
    #[error("Invalid username or password")]
    Authentication,

    /// Caller's role is insufficient. Does not leak which role would do.
    #[error("Access denied")]
    Authorization,

    /// Approval transition attempted from the wrong state.
    #[error("{0}")]
    State(String),

    #[error("{0}")]
    NotFound(String),

    /// Token-shaped failures: missing/invalid bearer, unknown or expired
    /// refresh session.
    #[error("{0}")]
    Token(String),

    /// Startup misconfiguration. Aborts the process, never surfaced
    /// per-request.
    #[error("{0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::State(_) => StatusCode::BAD_REQUEST,
            Self::Duplicate(_) => StatusCode::CONFLICT,
            Self::Authentication | Self::Token(_) => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Configuration(_) | Self::Internal(_) | Self::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message rendered to the caller. Internal detail never leaves the
    /// process; 5xx kinds collapse to one sanitized string.
    pub fn public_message(&self) -> String {
        match self {
            Self::Configuration(_) | Self::Internal(_) | Self::Storage(_) => {
                "An unexpected error occurred. Please try again later.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        let body = Json(ApiResponse::<()>::error(self.public_message()));
        (status, body).into_response()
    }
}
