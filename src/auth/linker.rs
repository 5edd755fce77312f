//! Federated identity reconciliation.
//!
//! An assertion arrives already verified upstream; this module resolves it
//! to exactly one local account. Resolution order: by external id, then by
//! email (linking the identity onto the existing account), then by
//! provisioning a fresh password-less account.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::errors::{AuthError, DuplicateField};
use crate::auth::store::IdentityStore;
use crate::auth::types::{Account, AccountStatus, FederatedAssertion, Role};

/// Provision attempts before conceding the username race.
const MAX_PROVISION_ATTEMPTS: usize = 5;

pub struct IdentityLinker {
    store: Arc<IdentityStore>,
}

impl IdentityLinker {
    pub fn new(store: Arc<IdentityStore>) -> Self {
        Self { store }
    }

    /// Resolve the assertion to one local account. Provider-side name and
    /// picture drift is not synced back on repeat logins.
    pub async fn resolve(&self, assertion: &FederatedAssertion) -> Result<Account, AuthError> {
        if let Some(account) = self.store.find_by_external_id(&assertion.subject).await? {
            tracing::info!("Federated user {} logged in", account.username);
            return Ok(account);
        }

        if let Some(account) = self.store.find_by_email(&assertion.email).await? {
            return self.link(account, &assertion.subject).await;
        }

        self.provision(assertion).await
    }

    async fn link(&self, account: Account, external_id: &str) -> Result<Account, AuthError> {
        if let Some(existing) = account.external_id.as_deref() {
            if existing != external_id {
                // The email's account is already bound to another identity;
                // re-binding it silently would hand the account over.
                return Err(AuthError::Duplicate(DuplicateField::ExternalId));
            }
        }
        self.store
            .link_external_id(&account.id, external_id, Utc::now())
            .await?;
        tracing::info!(
            "Linked existing user {} with federated identity",
            account.username
        );
        self.store.find_by_id(&account.id).await?.ok_or_else(|| {
            AuthError::Internal(format!("account {} vanished after linking", account.id))
        })
    }

    /// Create a fresh account for an unseen identity. The username pre-check
    /// is racy across requests, so the insert relies on the UNIQUE
    /// constraint and retries with the next free suffix on collision.
    async fn provision(&self, assertion: &FederatedAssertion) -> Result<Account, AuthError> {
        let base = derive_base_username(&assertion.email);

        for _ in 0..MAX_PROVISION_ATTEMPTS {
            let username = self.first_free_username(&base).await?;
            let now = Utc::now();
            let account = Account {
                id: Uuid::new_v4().to_string(),
                username,
                email: assertion.email.clone(),
                password_hash: String::new(),
                enabled: true,
                status: AccountStatus::Approved,
                role: Role::NormalUser,
                requested_role: None,
                approval_notes: None,
                approved_by: None,
                approved_at: None,
                external_id: Some(assertion.subject.clone()),
                created_at: now,
                updated_at: now,
            };
            match self.store.insert_account(&account).await {
                Ok(()) => {
                    tracing::info!(
                        "Created new user from federated identity: {}",
                        account.username
                    );
                    return Ok(account);
                }
                Err(AuthError::Duplicate(DuplicateField::Username)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(AuthError::Duplicate(DuplicateField::Username))
    }

    async fn first_free_username(&self, base: &str) -> Result<String, AuthError> {
        let mut candidate = base.to_string();
        let mut counter = 1;
        while self.store.username_exists(&candidate).await? {
            candidate = format!("{}{}", base, counter);
            counter += 1;
        }
        Ok(candidate)
    }
}

/// Derive the base username from the email local-part: ASCII alphanumerics
/// only, `user` prefix when the remainder is shorter than 3 chars, then
/// lowercased. Emails without `@` fall back to a timestamped name.
fn derive_base_username(email: &str) -> String {
    let local = match email.split_once('@') {
        Some((local, _)) => local,
        None => return format!("user{}", Utc::now().timestamp_millis()),
    };
    let mut cleaned: String = local.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if cleaned.len() < 3 {
        cleaned = format!("user{}", cleaned);
    }
    cleaned.to_lowercase()
}
