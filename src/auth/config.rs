//! Service configuration, loaded from the environment.

use crate::auth::errors::AuthError;

pub const DEFAULT_ACCESS_TOKEN_TTL: u64 = 3600;
pub const DEFAULT_REFRESH_TOKEN_TTL: u64 = 604_800;

/// Runtime configuration. `jwt_secret` has no default: a missing or weak
/// signing secret aborts startup instead of being papered over.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub access_token_ttl: u64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_ttl: u64,
    pub database_url: String,
    pub bind_addr: String,
    /// bcrypt work factor for password hashing.
    pub bcrypt_cost: u32,
    pub admin_username: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl AuthConfig {
    /// Load from environment variables. A present-but-unparsable TTL is a
    /// configuration error, not a silent fallback to the default.
    pub fn from_env() -> Result<Self, AuthError> {
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| {
            AuthError::Configuration("JWT_SECRET must be set".to_string())
        })?;

        Ok(Self {
            jwt_secret,
            access_token_ttl: env_u64("ACCESS_TOKEN_EXPIRY_SECONDS", DEFAULT_ACCESS_TOKEN_TTL)?,
            refresh_token_ttl: env_u64("REFRESH_TOKEN_EXPIRY_SECONDS", DEFAULT_REFRESH_TOKEN_TTL)?,
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:vira_identity.db".to_string()),
            bind_addr: std::env::var("BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            bcrypt_cost: env_u64("BCRYPT_COST", bcrypt::DEFAULT_COST as u64)? as u32,
            admin_username: std::env::var("ADMIN_USERNAME")
                .unwrap_or_else(|_| "admin".to_string()),
            admin_email: std::env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@vira.com".to_string()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| "admin123".to_string()),
        })
    }
}

fn env_u64(name: &str, default: u64) -> Result<u64, AuthError> {
    match std::env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| {
            AuthError::Configuration(format!("{} must be a number of seconds, got '{}'", name, raw))
        }),
        Err(_) => Ok(default),
    }
}
