//! Authentication facade.
//!
//! Single entry surface composing the store, token and password services,
//! the approval workflow, and the identity linker. Handlers talk only to
//! this type. Admin operations take the already-authenticated caller and
//! perform an explicit capability check before delegating.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::approval::ApprovalService;
use crate::auth::config::AuthConfig;
use crate::auth::core::{PasswordService, TokenService};
use crate::auth::errors::{AuthError, DuplicateField};
use crate::auth::linker::IdentityLinker;
use crate::auth::store::IdentityStore;
use crate::auth::types::{
    Account, AccountStatus, AuthResponse, DecisionRequest, EscalationRequest, FederatedAssertion,
    LoginRequest, RegisterRequest, Role,
};
use crate::auth::validation;

pub struct AuthService {
    store: Arc<IdentityStore>,
    tokens: TokenService,
    passwords: PasswordService,
    approvals: ApprovalService,
    linker: IdentityLinker,
}

impl AuthService {
    pub fn new(store: Arc<IdentityStore>, config: &AuthConfig) -> Result<Self, AuthError> {
        let tokens = TokenService::new(
            &config.jwt_secret,
            config.access_token_ttl,
            config.refresh_token_ttl,
        )?;
        let passwords = PasswordService::new(config.bcrypt_cost);
        let approvals = ApprovalService::new(Arc::clone(&store), passwords.clone());
        let linker = IdentityLinker::new(Arc::clone(&store));
        Ok(Self {
            store,
            tokens,
            passwords,
            approvals,
            linker,
        })
    }

    /// Self-service registration. New accounts are auto-approved normal
    /// users and receive a token pair immediately.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AuthError> {
        tracing::info!("Registering new user: {}", request.username);
        validation::validate_username(&request.username)?;
        validation::validate_email(&request.email)?;
        validation::validate_password(&request.password)?;

        if self.store.username_exists(&request.username).await? {
            return Err(AuthError::Duplicate(DuplicateField::Username));
        }
        if self.store.email_exists(&request.email).await? {
            return Err(AuthError::Duplicate(DuplicateField::Email));
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4().to_string(),
            username: request.username.clone(),
            email: request.email.clone(),
            password_hash: self.passwords.hash(&request.password)?,
            enabled: true,
            status: AccountStatus::Approved,
            role: Role::NormalUser,
            requested_role: None,
            approval_notes: None,
            approved_by: None,
            approved_at: None,
            external_id: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_account(&account).await?;

        tracing::info!("User registered successfully: {}", account.username);
        self.issue_session(account).await
    }

    /// Password login, by username only. Every failure renders the same
    /// generic message; the enabled/status gate runs after the password
    /// check so the response does not reveal which part failed.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        tracing::info!("Attempting login for user: {}", request.username);

        let account = self
            .store
            .find_by_username(&request.username)
            .await?
            .ok_or(AuthError::Authentication)?;

        if !self.passwords.verify(&request.password, &account.password_hash) {
            return Err(AuthError::Authentication);
        }
        if !account.enabled || account.status != AccountStatus::Approved {
            return Err(AuthError::Authentication);
        }

        tracing::info!("User logged in successfully: {}", account.username);
        self.issue_session(account).await
    }

    /// Single-use refresh rotation. The stored session row is the expiry
    /// authority; the presented string must still parse as a refresh-typed
    /// token so arbitrary values never drive a table scan of deletes.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, AuthError> {
        self.tokens.validate_refresh(refresh_token)?;

        let session = self
            .store
            .find_session_by_token(refresh_token)
            .await?
            .ok_or_else(|| AuthError::Token("Refresh token not found".to_string()))?;

        if session.is_expired(Utc::now()) {
            self.store.delete_session_by_token(refresh_token).await?;
            return Err(AuthError::Token("Refresh token expired".to_string()));
        }

        let account = self
            .store
            .find_by_id(&session.account_id)
            .await?
            .ok_or_else(|| {
                AuthError::Internal(format!("session owner {} missing", session.account_id))
            })?;

        tracing::info!("Token refreshed for user: {}", account.username);
        self.issue_session(account).await
    }

    /// Best-effort session removal. Succeeds whether or not anything
    /// matched; only a storage failure errors.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AuthError> {
        if let Some(token) = refresh_token {
            if self.store.delete_session_by_token(token).await? {
                tracing::info!("User logged out successfully");
            }
        }
        Ok(())
    }

    /// Resolve a bearer access token to its live account. Refresh tokens
    /// are rejected here, and so are disabled accounts, so suspension takes
    /// effect before the token naturally expires.
    pub async fn authenticate(&self, token: &str) -> Result<Account, AuthError> {
        let claims = self.tokens.validate_access(token)?;
        let account = self
            .store
            .find_by_username(&claims.sub)
            .await?
            .ok_or(AuthError::Authentication)?;
        if !account.enabled {
            return Err(AuthError::Authentication);
        }
        Ok(account)
    }

    /// Federated login. The assertion was verified upstream; resolution may
    /// create or link an account, but a non-approved account still never
    /// gets tokens.
    pub async fn federated_login(
        &self,
        assertion: &FederatedAssertion,
    ) -> Result<AuthResponse, AuthError> {
        tracing::info!("Processing federated login");
        let account = self.linker.resolve(assertion).await?;
        if !account.enabled || account.status != AccountStatus::Approved {
            return Err(AuthError::Authentication);
        }
        self.issue_session(account).await
    }

    pub async fn request_escalation(
        &self,
        request: &EscalationRequest,
    ) -> Result<Account, AuthError> {
        self.approvals.request_escalation(request).await
    }

    // ---- admin operations ----

    pub async fn list_pending_approvals(&self, caller: &Account) -> Result<Vec<Account>, AuthError> {
        Self::require_admin(caller)?;
        self.approvals.list_pending().await
    }

    pub async fn decide_approval(
        &self,
        caller: &Account,
        request: &DecisionRequest,
    ) -> Result<Account, AuthError> {
        Self::require_admin(caller)?;
        self.approvals
            .decide(
                &request.account_id,
                request.approved,
                request.approval_notes.as_deref(),
                &caller.id,
            )
            .await
    }

    pub async fn set_role(
        &self,
        caller: &Account,
        account_id: &str,
        role: Role,
    ) -> Result<Account, AuthError> {
        Self::require_admin(caller)?;
        self.approvals.set_role(account_id, role, &caller.id).await
    }

    pub async fn register_super_user_by_admin(
        &self,
        caller: &Account,
        request: &EscalationRequest,
    ) -> Result<Account, AuthError> {
        Self::require_admin(caller)?;
        self.approvals
            .register_approved_by_admin(request, &caller.id)
            .await
    }

    /// Sweep refresh sessions past expiry. Callable by an embedding
    /// application or operator; this crate runs no timer of its own.
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AuthError> {
        let removed = self.store.delete_expired_sessions(Utc::now()).await?;
        if removed > 0 {
            tracing::info!("Removed {} expired refresh sessions", removed);
        }
        Ok(removed)
    }

    fn require_admin(caller: &Account) -> Result<(), AuthError> {
        if caller.role < Role::Admin {
            return Err(AuthError::Authorization);
        }
        Ok(())
    }

    /// Mint the token pair and replace the account's refresh session in one
    /// upsert. Every login-shaped operation funnels through here so the
    /// one-session-per-account invariant has a single writer.
    async fn issue_session(&self, account: Account) -> Result<AuthResponse, AuthError> {
        let access_token = self.tokens.issue_access_token(&account.username)?;
        let refresh_token = self.tokens.issue_refresh_token(&account.username)?;

        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.tokens.refresh_ttl() as i64);
        self.store
            .replace_refresh_session(&account.id, &refresh_token, expires_at, now)
            .await?;

        Ok(AuthResponse {
            account: account.into(),
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.access_ttl(),
        })
    }
}
