//! Field validation for registration-shaped requests.
//!
//! One function per field, checked before any persistence. Login input is
//! deliberately not validated here: every login failure must render the same
//! generic message, and a length complaint would leak which part was wrong.

use crate::auth::errors::AuthError;

pub fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::Validation("Username is required".to_string()));
    }
    if username.len() < 3 || username.len() > 20 {
        return Err(AuthError::Validation(
            "Username must be between 3 and 20 characters".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.is_empty() {
        return Err(AuthError::Validation("Email is required".to_string()));
    }
    if !email.contains('@') {
        return Err(AuthError::Validation("Email should be valid".to_string()));
    }
    if email.len() > 50 {
        return Err(AuthError::Validation(
            "Email must not exceed 50 characters".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }
    if password.len() < 6 || password.len() > 120 {
        return Err(AuthError::Validation(
            "Password must be between 6 and 120 characters".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_justification(justification: &str) -> Result<(), AuthError> {
    if justification.is_empty() {
        return Err(AuthError::Validation(
            "Justification is required".to_string(),
        ));
    }
    if justification.len() < 10 || justification.len() > 500 {
        return Err(AuthError::Validation(
            "Justification must be between 10 and 500 characters".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_organization(organization: Option<&str>) -> Result<(), AuthError> {
    if let Some(org) = organization {
        if org.len() > 100 {
            return Err(AuthError::Validation(
                "Organization must not exceed 100 characters".to_string(),
            ));
        }
    }
    Ok(())
}

pub fn validate_position(position: Option<&str>) -> Result<(), AuthError> {
    if let Some(pos) = position {
        if pos.len() > 50 {
            return Err(AuthError::Validation(
                "Position must not exceed 50 characters".to_string(),
            ));
        }
    }
    Ok(())
}

pub fn validate_decision_notes(notes: &str) -> Result<(), AuthError> {
    if notes.len() > 500 {
        return Err(AuthError::Validation(
            "Notes must not exceed 500 characters".to_string(),
        ));
    }
    Ok(())
}
