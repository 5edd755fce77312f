//! Password hashing and verification.

use crate::auth::errors::AuthError;

/// bcrypt-backed hasher. Federated-only accounts store an empty hash and
/// must never verify; `verify` treats the empty hash as a plain mismatch.
#[derive(Debug, Clone)]
pub struct PasswordService {
    cost: u32,
}

impl PasswordService {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, raw: &str) -> Result<String, AuthError> {
        bcrypt::hash(raw, self.cost)
            .map_err(|e| AuthError::Internal(format!("password hashing failed: {}", e)))
    }

    /// Check a candidate password against a stored hash. Returns `false`
    /// rather than erroring for the empty (federated-only) hash and for
    /// malformed stored hashes, so every mismatch renders the same generic
    /// login failure.
    pub fn verify(&self, raw: &str, stored_hash: &str) -> bool {
        if stored_hash.is_empty() {
            return false;
        }
        match bcrypt::verify(raw, stored_hash) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!("stored password hash failed to parse: {}", e);
                false
            }
        }
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
