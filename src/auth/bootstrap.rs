//! Startup seeding: role registry and default administrator.
//!
//! Runs once during process startup, never on the request path. Everything
//! here is idempotent; any failure aborts startup.

use chrono::Utc;
use uuid::Uuid;

use crate::auth::config::AuthConfig;
use crate::auth::core::PasswordService;
use crate::auth::errors::AuthError;
use crate::auth::store::IdentityStore;
use crate::auth::types::{Account, AccountStatus, Role};

pub async fn run(
    store: &IdentityStore,
    config: &AuthConfig,
    passwords: &PasswordService,
) -> Result<(), AuthError> {
    seed_roles(store).await?;
    ensure_default_admin(store, config, passwords).await?;
    Ok(())
}

async fn seed_roles(store: &IdentityStore) -> Result<(), AuthError> {
    for role in Role::ALL {
        store.ensure_role(role).await?;
    }
    // A seed role missing after insertion is a broken deployment, not a
    // per-request condition.
    for role in Role::ALL {
        if !store.role_exists(role).await? {
            return Err(AuthError::Configuration(format!(
                "Role {} missing after seeding",
                role
            )));
        }
    }
    tracing::info!("✅ Role registry seeded");
    Ok(())
}

async fn ensure_default_admin(
    store: &IdentityStore,
    config: &AuthConfig,
    passwords: &PasswordService,
) -> Result<(), AuthError> {
    if store.has_account_with_role(Role::Admin).await? {
        return Ok(());
    }

    let now = Utc::now();
    let admin = Account {
        id: Uuid::new_v4().to_string(),
        username: config.admin_username.clone(),
        email: config.admin_email.clone(),
        password_hash: passwords.hash(&config.admin_password)?,
        enabled: true,
        status: AccountStatus::Approved,
        role: Role::Admin,
        requested_role: None,
        approval_notes: None,
        approved_by: None,
        approved_at: None,
        external_id: None,
        created_at: now,
        updated_at: now,
    };
    match store.insert_account(&admin).await {
        Ok(()) => {
            tracing::info!("✅ Created default admin account: {}", admin.username);
            Ok(())
        }
        // Another instance won the startup race; the admin exists.
        Err(AuthError::Duplicate(_)) => Ok(()),
        Err(e) => Err(e),
    }
}
