//! Token minting and validation.
//!
//! Access and refresh tokens are HS256-signed JWTs over the same shared
//! secret. Refresh tokens carry a `type=refresh` claim; access-token
//! validation rejects anything carrying that marker, so a captured refresh
//! token cannot be replayed against protected resources.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::errors::AuthError;

pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT payload. `sub` is the account's username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    /// `Some("refresh")` on refresh tokens, absent on access tokens.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Unique token id. `iat` alone has second resolution, which would make
    /// two tokens issued for the same subject in the same second identical.
    pub jti: String,
}

impl Claims {
    pub fn is_refresh(&self) -> bool {
        self.token_type.as_deref() == Some(TOKEN_TYPE_REFRESH)
    }
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: u64,
    refresh_ttl: u64,
}

/// Manual impl: the jsonwebtoken key types do not implement `Debug`, and the
/// signing secret must not appear in debug output anyway.
impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build the service. Refuses secrets under 32 bytes; that is a startup
    /// configuration error, not a per-request condition.
    pub fn new(secret: &str, access_ttl: u64, refresh_ttl: u64) -> Result<Self, AuthError> {
        if secret.len() < 32 {
            return Err(AuthError::Configuration(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn issue_access_token(&self, username: &str) -> Result<String, AuthError> {
        self.issue(username, self.access_ttl, None)
    }

    pub fn issue_refresh_token(&self, username: &str) -> Result<String, AuthError> {
        self.issue(username, self.refresh_ttl, Some(TOKEN_TYPE_REFRESH.to_string()))
    }

    pub fn access_ttl(&self) -> u64 {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> u64 {
        self.refresh_ttl
    }

    fn issue(&self, username: &str, ttl: u64, token_type: Option<String>) -> Result<String, AuthError> {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + ttl as usize,
            token_type,
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token signing failed: {}", e)))
    }

    /// Validate an access token: signature, expiry, and that it is not a
    /// refresh token in disguise. Signature failure and expiry surface as
    /// the same error to the caller.
    pub fn validate_access(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AuthError::Token("Invalid token".to_string()))?;
        if data.claims.is_refresh() {
            return Err(AuthError::Token("Invalid token".to_string()));
        }
        Ok(data.claims)
    }

    /// Check that a presented refresh token was signed by us and carries the
    /// refresh marker. Expiry is deliberately not checked: the stored
    /// session row is the expiry authority, and the expired path must still
    /// reach the row to delete it.
    pub fn validate_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AuthError::Token("Invalid refresh token".to_string()))?;
        if !data.claims.is_refresh() {
            return Err(AuthError::Token("Invalid refresh token".to_string()));
        }
        Ok(data.claims)
    }
}
