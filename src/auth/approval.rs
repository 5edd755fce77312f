//! Privilege-escalation approval workflow.
//!
//! Escalation requests create disabled PENDING_APPROVAL accounts; an admin
//! decision moves them to APPROVED (enabled, SUPER_USER) or REJECTED
//! (terminal, still disabled). Accounts never authenticate while pending.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::core::PasswordService;
use crate::auth::errors::{AuthError, DuplicateField};
use crate::auth::store::IdentityStore;
use crate::auth::types::{Account, AccountStatus, EscalationRequest, Role};
use crate::auth::validation;

pub struct ApprovalService {
    store: Arc<IdentityStore>,
    passwords: PasswordService,
}

impl ApprovalService {
    pub fn new(store: Arc<IdentityStore>, passwords: PasswordService) -> Self {
        Self { store, passwords }
    }

    /// Submit an escalation request. The caller gets the pending account
    /// back but no tokens; the account cannot log in until approved.
    pub async fn request_escalation(
        &self,
        request: &EscalationRequest,
    ) -> Result<Account, AuthError> {
        self.validate_escalation_input(request)?;
        self.check_duplicates(&request.username, &request.email).await?;

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4().to_string(),
            username: request.username.clone(),
            email: request.email.clone(),
            password_hash: self.passwords.hash(&request.password)?,
            enabled: false,
            status: AccountStatus::PendingApproval,
            role: Role::Guest,
            requested_role: Some(Role::SuperUser),
            approval_notes: Some(build_approval_notes(
                &request.justification,
                request.organization.as_deref(),
                request.position.as_deref(),
            )),
            approved_by: None,
            approved_at: None,
            external_id: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_account(&account).await?;

        tracing::info!(
            "Super user registration submitted for approval: {}",
            account.username
        );
        Ok(account)
    }

    pub async fn list_pending(&self) -> Result<Vec<Account>, AuthError> {
        self.store.list_by_status(AccountStatus::PendingApproval).await
    }

    /// Apply an admin decision to a pending account.
    pub async fn decide(
        &self,
        account_id: &str,
        approved: bool,
        notes: Option<&str>,
        deciding_admin_id: &str,
    ) -> Result<Account, AuthError> {
        if let Some(n) = notes {
            validation::validate_decision_notes(n)?;
        }
        let account = self
            .store
            .decide_escalation(account_id, approved, notes, deciding_admin_id, Utc::now())
            .await?;

        if approved {
            tracing::info!(
                "Super user approved: {} by admin: {}",
                account.username,
                deciding_admin_id
            );
        } else {
            tracing::info!(
                "Super user rejected: {} by admin: {}",
                account.username,
                deciding_admin_id
            );
        }
        Ok(account)
    }

    /// Unconditional role override. Bypasses the approval transitions and
    /// leaves status, enabled flag, and any live refresh session untouched.
    pub async fn set_role(
        &self,
        account_id: &str,
        role: Role,
        acting_admin_id: &str,
    ) -> Result<Account, AuthError> {
        let account = self.store.set_role(account_id, role, Utc::now()).await?;
        tracing::info!(
            "User role updated: {} to {} by admin: {}",
            account.username,
            role,
            acting_admin_id
        );
        Ok(account)
    }

    /// Admin bypass registration: the account is written once, already in
    /// its final approved state, attributed to the calling admin.
    pub async fn register_approved_by_admin(
        &self,
        request: &EscalationRequest,
        admin_id: &str,
    ) -> Result<Account, AuthError> {
        self.validate_escalation_input(request)?;
        self.check_duplicates(&request.username, &request.email).await?;

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4().to_string(),
            username: request.username.clone(),
            email: request.email.clone(),
            password_hash: self.passwords.hash(&request.password)?,
            enabled: true,
            status: AccountStatus::Approved,
            role: Role::SuperUser,
            requested_role: Some(Role::SuperUser),
            approval_notes: Some("Auto-approved by admin during registration".to_string()),
            approved_by: Some(admin_id.to_string()),
            approved_at: Some(now),
            external_id: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_account(&account).await?;

        tracing::info!(
            "Super user registered by admin: {} (admin: {})",
            account.username,
            admin_id
        );
        Ok(account)
    }

    fn validate_escalation_input(&self, request: &EscalationRequest) -> Result<(), AuthError> {
        validation::validate_username(&request.username)?;
        validation::validate_email(&request.email)?;
        validation::validate_password(&request.password)?;
        validation::validate_justification(&request.justification)?;
        validation::validate_organization(request.organization.as_deref())?;
        validation::validate_position(request.position.as_deref())?;
        Ok(())
    }

    async fn check_duplicates(&self, username: &str, email: &str) -> Result<(), AuthError> {
        if self.store.username_exists(username).await? {
            return Err(AuthError::Duplicate(DuplicateField::Username));
        }
        if self.store.email_exists(email).await? {
            return Err(AuthError::Duplicate(DuplicateField::Email));
        }
        Ok(())
    }
}

/// Render the request's justification/organization/position into the stored
/// notes string. Empty optional fields are left out entirely.
fn build_approval_notes(
    justification: &str,
    organization: Option<&str>,
    position: Option<&str>,
) -> String {
    let mut notes = format!("Justification: {}", justification);
    if let Some(org) = organization.filter(|o| !o.is_empty()) {
        notes.push_str(" | Organization: ");
        notes.push_str(org);
    }
    if let Some(pos) = position.filter(|p| !p.is_empty()) {
        notes.push_str(" | Position: ");
        notes.push_str(pos);
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn setup() -> (ApprovalService, Arc<IdentityStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}/identity.db", dir.path().display());
        let store = Arc::new(IdentityStore::new(&url).await.unwrap());
        let service = ApprovalService::new(Arc::clone(&store), PasswordService::new(4));
        (service, store, dir)
    }

    fn escalation_request(username: &str, email: &str) -> EscalationRequest {
        EscalationRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "pw123456".to_string(),
            justification: "Need access to manage datasets".to_string(),
            organization: None,
            position: None,
        }
    }

    #[test]
    fn notes_carry_only_present_fields() {
        assert_eq!(
            build_approval_notes("need access to data", None, None),
            "Justification: need access to data"
        );
        assert_eq!(
            build_approval_notes("need access to data", Some("Acme"), None),
            "Justification: need access to data | Organization: Acme"
        );
        assert_eq!(
            build_approval_notes("need access to data", Some("Acme"), Some("Engineer")),
            "Justification: need access to data | Organization: Acme | Position: Engineer"
        );
        // Empty strings behave like absent fields.
        assert_eq!(
            build_approval_notes("need access to data", Some(""), Some("Engineer")),
            "Justification: need access to data | Position: Engineer"
        );
    }

    #[tokio::test]
    async fn escalation_creates_a_disabled_pending_guest() {
        let (service, store, _dir) = setup().await;
        let mut request = escalation_request("bob", "bob@x.com");
        request.organization = Some("Acme".to_string());

        let account = service.request_escalation(&request).await.unwrap();
        assert!(!account.enabled);
        assert_eq!(account.status, AccountStatus::PendingApproval);
        assert_eq!(account.role, Role::Guest);
        assert_eq!(account.requested_role, Some(Role::SuperUser));
        assert_eq!(
            account.approval_notes.as_deref(),
            Some("Justification: Need access to manage datasets | Organization: Acme")
        );
        assert!(account.approved_by.is_none());

        let stored = store.find_by_username("bob").await.unwrap().unwrap();
        assert_eq!(stored, account);
    }

    #[tokio::test]
    async fn escalation_rejects_duplicates_before_insert() {
        let (service, store, _dir) = setup().await;
        service
            .request_escalation(&escalation_request("bob", "bob@x.com"))
            .await
            .unwrap();

        let err = service
            .request_escalation(&escalation_request("bob", "other@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Duplicate(DuplicateField::Username)));

        let err = service
            .request_escalation(&escalation_request("carol", "bob@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Duplicate(DuplicateField::Email)));

        assert!(!store.username_exists("carol").await.unwrap());
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_store() {
        let (service, store, _dir) = setup().await;
        let mut request = escalation_request("bob", "bob@x.com");
        request.justification = "too short".to_string();

        let err = service.request_escalation(&request).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert!(!store.username_exists("bob").await.unwrap());
    }

    #[tokio::test]
    async fn full_approval_round_trip() {
        let (service, _store, _dir) = setup().await;
        let pending = service
            .request_escalation(&escalation_request("bob", "bob@x.com"))
            .await
            .unwrap();

        let listed = service.list_pending().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, pending.id);

        let approved = service
            .decide(&pending.id, true, Some("verified employment"), "admin-1")
            .await
            .unwrap();
        assert_eq!(approved.status, AccountStatus::Approved);
        assert_eq!(approved.role, Role::SuperUser);
        assert!(approved.enabled);

        assert!(service.list_pending().await.unwrap().is_empty());

        // A second decision on the same account is a state error.
        let err = service
            .decide(&pending.id, false, None, "admin-1")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::State(_)));
    }

    #[tokio::test]
    async fn oversized_decision_notes_are_rejected() {
        let (service, _store, _dir) = setup().await;
        let pending = service
            .request_escalation(&escalation_request("bob", "bob@x.com"))
            .await
            .unwrap();

        let notes = "n".repeat(501);
        let err = service
            .decide(&pending.id, true, Some(&notes), "admin-1")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        // Still pending, the decision never applied.
        assert_eq!(service.list_pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn admin_bypass_lands_in_the_final_state() {
        let (service, store, _dir) = setup().await;
        let account = service
            .register_approved_by_admin(&escalation_request("eve", "eve@x.com"), "admin-1")
            .await
            .unwrap();

        assert!(account.enabled);
        assert_eq!(account.status, AccountStatus::Approved);
        assert_eq!(account.role, Role::SuperUser);
        assert_eq!(account.approved_by.as_deref(), Some("admin-1"));
        assert_eq!(
            account.approval_notes.as_deref(),
            Some("Auto-approved by admin during registration")
        );

        // Nothing pending: the bypass never parks the account.
        assert!(service.list_pending().await.unwrap().is_empty());
        let stored = store.find_by_username("eve").await.unwrap().unwrap();
        assert_eq!(stored.status, AccountStatus::Approved);
    }

    #[tokio::test]
    async fn set_role_overrides_regardless_of_status() {
        let (service, _store, _dir) = setup().await;
        let pending = service
            .request_escalation(&escalation_request("bob", "bob@x.com"))
            .await
            .unwrap();
        service.decide(&pending.id, false, None, "admin-1").await.unwrap();

        let updated = service.set_role(&pending.id, Role::Admin, "admin-1").await.unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.status, AccountStatus::Rejected);
    }
}
