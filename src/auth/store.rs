//! Persistent identity store (SQLite).
//!
//! One store backs accounts, the role registry, and refresh sessions.
//! UNIQUE violations are translated into field-specific duplicate errors at
//! this boundary, and multi-step mutations run inside a transaction so a
//! decision or a session replacement is all-or-nothing.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::auth::errors::{AuthError, DuplicateField};
use crate::auth::types::{Account, AccountStatus, RefreshSession, Role};

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, enabled, status, role, \
     requested_role, approval_notes, approved_by, approved_at, external_id, created_at, updated_at";

pub struct IdentityStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    enabled: bool,
    status: String,
    role: String,
    requested_role: Option<String>,
    approval_notes: Option<String>,
    approved_by: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    external_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AuthError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let status = AccountStatus::parse(&row.status).ok_or_else(|| {
            AuthError::Internal(format!("unknown account status '{}' in store", row.status))
        })?;
        let role = Role::parse(&row.role).ok_or_else(|| {
            AuthError::Internal(format!("unknown role '{}' in store", row.role))
        })?;
        let requested_role = match row.requested_role.as_deref() {
            Some(raw) => Some(Role::parse(raw).ok_or_else(|| {
                AuthError::Internal(format!("unknown requested role '{}' in store", raw))
            })?),
            None => None,
        };
        Ok(Account {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            enabled: row.enabled,
            status,
            role,
            requested_role,
            approval_notes: row.approval_notes,
            approved_by: row.approved_by,
            approved_at: row.approved_at,
            external_id: row.external_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map a UNIQUE-constraint violation to the colliding field, if any.
fn duplicate_field(err: &sqlx::Error) -> Option<DuplicateField> {
    let msg = err.to_string();
    if !msg.contains("UNIQUE constraint failed") {
        return None;
    }
    if msg.contains("accounts.username") {
        Some(DuplicateField::Username)
    } else if msg.contains("accounts.email") {
        Some(DuplicateField::Email)
    } else if msg.contains("accounts.external_id") {
        Some(DuplicateField::ExternalId)
    } else {
        None
    }
}

impl IdentityStore {
    /// Open (creating if missing) the database and apply the schema.
    pub async fn new(database_url: &str) -> Result<Self, AuthError> {
        tracing::info!("📂 Opening identity database: {}", database_url);

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AuthError::Configuration(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;

        sqlx::query(include_str!("../../migrations/001_create_identity_tables.sql"))
            .execute(&pool)
            .await?;

        tracing::info!("✅ Identity database ready");
        Ok(Self { pool })
    }

    // ---- accounts ----

    pub async fn insert_account(&self, account: &Account) -> Result<(), AuthError> {
        let result = sqlx::query(
            "INSERT INTO accounts (id, username, email, password_hash, enabled, status, role, \
             requested_role, approval_notes, approved_by, approved_at, external_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.enabled)
        .bind(account.status.as_str())
        .bind(account.role.as_str())
        .bind(account.requested_role.map(|r| r.as_str()))
        .bind(&account.approval_notes)
        .bind(&account.approved_by)
        .bind(account.approved_at)
        .bind(&account.external_id)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => match duplicate_field(&e) {
                Some(field) => Err(AuthError::Duplicate(field)),
                None => Err(e.into()),
            },
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE id = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Account::try_from).transpose()
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE username = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Account::try_from).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE email = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Account::try_from).transpose()
    }

    pub async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE external_id = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Account::try_from).transpose()
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE username = ?)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = ?)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn has_account_with_role(&self, role: Role) -> Result<bool, AuthError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE role = ?)")
                .bind(role.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn list_by_status(&self, status: AccountStatus) -> Result<Vec<Account>, AuthError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE status = ? ORDER BY created_at, id",
            ACCOUNT_COLUMNS
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Account::try_from).collect()
    }

    /// Bind a federated identity to an existing account.
    pub async fn link_external_id(
        &self,
        account_id: &str,
        external_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let result = sqlx::query("UPDATE accounts SET external_id = ?, updated_at = ? WHERE id = ?")
            .bind(external_id)
            .bind(now)
            .bind(account_id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(r) if r.rows_affected() == 0 => {
                Err(AuthError::NotFound("User not found".to_string()))
            }
            Ok(_) => Ok(()),
            Err(e) => match duplicate_field(&e) {
                Some(field) => Err(AuthError::Duplicate(field)),
                None => Err(e.into()),
            },
        }
    }

    /// Unconditional role replacement (admin override). Ignores status.
    pub async fn set_role(
        &self,
        account_id: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Account, AuthError> {
        let result = sqlx::query("UPDATE accounts SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(now)
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound("User not found".to_string()));
        }
        self.find_by_id(account_id).await?.ok_or_else(|| {
            AuthError::Internal(format!("account {} vanished after role update", account_id))
        })
    }

    /// Apply an approval decision. The status check and the mutation happen
    /// inside one transaction, so a decision on a non-pending account never
    /// half-applies.
    pub async fn decide_escalation(
        &self,
        account_id: &str,
        approved: bool,
        notes: Option<&str>,
        deciding_admin_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Account, AuthError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE id = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await?;
        let mut account: Account = row
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?
            .try_into()?;

        if account.status != AccountStatus::PendingApproval {
            return Err(AuthError::State(format!(
                "User is not pending approval (current status: {})",
                account.status
            )));
        }

        if approved {
            account.status = AccountStatus::Approved;
            account.enabled = true;
            account.role = Role::SuperUser;
        } else {
            account.status = AccountStatus::Rejected;
        }
        if let Some(n) = notes {
            account.approval_notes = Some(n.to_string());
        }
        account.approved_by = Some(deciding_admin_id.to_string());
        account.approved_at = Some(now);
        account.updated_at = now;

        sqlx::query(
            "UPDATE accounts SET status = ?, enabled = ?, role = ?, approval_notes = ?, \
             approved_by = ?, approved_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(account.status.as_str())
        .bind(account.enabled)
        .bind(account.role.as_str())
        .bind(&account.approval_notes)
        .bind(&account.approved_by)
        .bind(account.approved_at)
        .bind(account.updated_at)
        .bind(&account.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(account)
    }

    // ---- role registry ----

    pub async fn ensure_role(&self, role: Role) -> Result<(), AuthError> {
        sqlx::query("INSERT INTO roles (name, description) VALUES (?, ?) ON CONFLICT(name) DO NOTHING")
            .bind(role.as_str())
            .bind(role.description())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn role_exists(&self, role: Role) -> Result<bool, AuthError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM roles WHERE name = ?)")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    // ---- refresh sessions ----

    /// Insert or replace the account's refresh session. `UNIQUE(account_id)`
    /// turns replacement into a single atomic upsert: the previous token
    /// value stops resolving the moment the new one lands.
    pub async fn replace_refresh_session(
        &self,
        account_id: &str,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        sqlx::query(
            "INSERT INTO refresh_sessions (account_id, token, expires_at, created_at) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT(account_id) DO UPDATE SET \
             token = excluded.token, expires_at = excluded.expires_at, created_at = excluded.created_at",
        )
        .bind(account_id)
        .bind(token)
        .bind(expires_at)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_session_by_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshSession>, AuthError> {
        let row = sqlx::query_as::<_, (String, String, DateTime<Utc>, DateTime<Utc>)>(
            "SELECT account_id, token, expires_at, created_at FROM refresh_sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(account_id, token, expires_at, created_at)| RefreshSession {
            account_id,
            token,
            expires_at,
            created_at,
        }))
    }

    /// Returns whether a session was actually removed.
    pub async fn delete_session_by_token(&self, token: &str) -> Result<bool, AuthError> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Sweep every session past its expiry. Callable by an operator; this
    /// core owns no timer.
    pub async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    async fn test_store() -> (IdentityStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}/identity.db", dir.path().display());
        let store = IdentityStore::new(&url).await.unwrap();
        (store, dir)
    }

    fn sample_account(username: &str, email: &str) -> Account {
        let now = Utc::now();
        Account {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
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
        }
    }

    fn pending_account(username: &str, email: &str) -> Account {
        Account {
            enabled: false,
            status: AccountStatus::PendingApproval,
            role: Role::Guest,
            requested_role: Some(Role::SuperUser),
            approval_notes: Some("Justification: need access".to_string()),
            ..sample_account(username, email)
        }
    }

    #[tokio::test]
    async fn insert_and_find_round_trip() {
        let (store, _dir) = test_store().await;
        let account = sample_account("alice", "alice@example.com");
        store.insert_account(&account).await.unwrap();

        let by_username = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_username.id, account.id);
        assert_eq!(by_username.email, "alice@example.com");
        assert_eq!(by_username.status, AccountStatus::Approved);
        assert_eq!(by_username.role, Role::NormalUser);

        let by_email = store.find_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, account.id);

        let by_id = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");

        assert!(store.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_field_specific() {
        let (store, _dir) = test_store().await;
        store
            .insert_account(&sample_account("alice", "alice@example.com"))
            .await
            .unwrap();

        let err = store
            .insert_account(&sample_account("alice", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Duplicate(DuplicateField::Username)));

        let err = store
            .insert_account(&sample_account("bob", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Duplicate(DuplicateField::Email)));
    }

    #[tokio::test]
    async fn duplicate_external_id_is_rejected() {
        let (store, _dir) = test_store().await;
        let mut first = sample_account("alice", "alice@example.com");
        first.external_id = Some("google-1".to_string());
        store.insert_account(&first).await.unwrap();

        let mut second = sample_account("bob", "bob@example.com");
        second.external_id = Some("google-1".to_string());
        let err = store.insert_account(&second).await.unwrap_err();
        assert!(matches!(err, AuthError::Duplicate(DuplicateField::ExternalId)));
    }

    #[tokio::test]
    async fn existence_probes() {
        let (store, _dir) = test_store().await;
        store
            .insert_account(&sample_account("alice", "alice@example.com"))
            .await
            .unwrap();

        assert!(store.username_exists("alice").await.unwrap());
        assert!(!store.username_exists("bob").await.unwrap());
        assert!(store.email_exists("alice@example.com").await.unwrap());
        assert!(!store.email_exists("bob@example.com").await.unwrap());
        assert!(store.has_account_with_role(Role::NormalUser).await.unwrap());
        assert!(!store.has_account_with_role(Role::Admin).await.unwrap());
    }

    #[tokio::test]
    async fn link_external_id_sets_and_conflicts() {
        let (store, _dir) = test_store().await;
        let alice = sample_account("alice", "alice@example.com");
        store.insert_account(&alice).await.unwrap();

        store
            .link_external_id(&alice.id, "google-9", Utc::now())
            .await
            .unwrap();
        let linked = store.find_by_external_id("google-9").await.unwrap().unwrap();
        assert_eq!(linked.id, alice.id);

        let bob = sample_account("bob", "bob@example.com");
        store.insert_account(&bob).await.unwrap();
        let err = store
            .link_external_id(&bob.id, "google-9", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Duplicate(DuplicateField::ExternalId)));

        let err = store
            .link_external_id("missing-id", "google-10", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn approval_decision_approves_pending_account() {
        let (store, _dir) = test_store().await;
        let bob = pending_account("bob", "bob@example.com");
        store.insert_account(&bob).await.unwrap();

        let decided = store
            .decide_escalation(&bob.id, true, Some("looks legit"), "admin-1", Utc::now())
            .await
            .unwrap();
        assert_eq!(decided.status, AccountStatus::Approved);
        assert!(decided.enabled);
        assert_eq!(decided.role, Role::SuperUser);
        assert_eq!(decided.approved_by.as_deref(), Some("admin-1"));
        assert!(decided.approved_at.is_some());
        assert_eq!(decided.approval_notes.as_deref(), Some("looks legit"));

        // Persisted, not just returned.
        let reloaded = store.find_by_id(&bob.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, AccountStatus::Approved);
        assert_eq!(reloaded.role, Role::SuperUser);
    }

    #[tokio::test]
    async fn approval_decision_rejects_and_keeps_disabled() {
        let (store, _dir) = test_store().await;
        let bob = pending_account("bob", "bob@example.com");
        store.insert_account(&bob).await.unwrap();

        let decided = store
            .decide_escalation(&bob.id, false, None, "admin-1", Utc::now())
            .await
            .unwrap();
        assert_eq!(decided.status, AccountStatus::Rejected);
        assert!(!decided.enabled);
        assert_eq!(decided.role, Role::Guest);
        // No notes passed: the request-time notes survive.
        assert_eq!(
            decided.approval_notes.as_deref(),
            Some("Justification: need access")
        );
    }

    #[tokio::test]
    async fn deciding_a_non_pending_account_is_a_state_error() {
        let (store, _dir) = test_store().await;
        let alice = sample_account("alice", "alice@example.com");
        store.insert_account(&alice).await.unwrap();

        let err = store
            .decide_escalation(&alice.id, true, None, "admin-1", Utc::now())
            .await
            .unwrap_err();
        match err {
            AuthError::State(msg) => assert!(msg.contains("APPROVED"), "message was: {}", msg),
            other => panic!("expected state error, got {:?}", other),
        }

        let err = store
            .decide_escalation("missing-id", true, None, "admin-1", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn rejected_accounts_cannot_be_redecided() {
        let (store, _dir) = test_store().await;
        let bob = pending_account("bob", "bob@example.com");
        store.insert_account(&bob).await.unwrap();
        store
            .decide_escalation(&bob.id, false, None, "admin-1", Utc::now())
            .await
            .unwrap();

        let err = store
            .decide_escalation(&bob.id, true, None, "admin-1", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::State(_)));
    }

    #[tokio::test]
    async fn set_role_ignores_status() {
        let (store, _dir) = test_store().await;
        let bob = pending_account("bob", "bob@example.com");
        store.insert_account(&bob).await.unwrap();
        store
            .decide_escalation(&bob.id, false, None, "admin-1", Utc::now())
            .await
            .unwrap();

        let updated = store.set_role(&bob.id, Role::Admin, Utc::now()).await.unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.status, AccountStatus::Rejected);

        let err = store.set_role("missing-id", Role::Admin, Utc::now()).await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_by_status_returns_pending_in_insertion_order() {
        let (store, _dir) = test_store().await;
        store.insert_account(&pending_account("bob", "bob@example.com")).await.unwrap();
        store.insert_account(&sample_account("alice", "alice@example.com")).await.unwrap();
        store.insert_account(&pending_account("carol", "carol@example.com")).await.unwrap();

        let pending = store.list_by_status(AccountStatus::PendingApproval).await.unwrap();
        let names: Vec<_> = pending.iter().map(|a| a.username.as_str()).collect();
        assert_eq!(names, vec!["bob", "carol"]);
    }

    #[tokio::test]
    async fn role_registry_seeding_is_idempotent() {
        let (store, _dir) = test_store().await;
        assert!(!store.role_exists(Role::Admin).await.unwrap());

        store.ensure_role(Role::Admin).await.unwrap();
        store.ensure_role(Role::Admin).await.unwrap();
        assert!(store.role_exists(Role::Admin).await.unwrap());
    }

    #[tokio::test]
    async fn session_replacement_kills_the_old_token() {
        let (store, _dir) = test_store().await;
        let alice = sample_account("alice", "alice@example.com");
        store.insert_account(&alice).await.unwrap();
        let now = Utc::now();
        let expires = now + chrono::Duration::days(7);

        store
            .replace_refresh_session(&alice.id, "token-one", expires, now)
            .await
            .unwrap();
        store
            .replace_refresh_session(&alice.id, "token-two", expires, now)
            .await
            .unwrap();

        assert!(store.find_session_by_token("token-one").await.unwrap().is_none());
        let live = store.find_session_by_token("token-two").await.unwrap().unwrap();
        assert_eq!(live.account_id, alice.id);
    }

    #[tokio::test]
    async fn sessions_are_per_account() {
        let (store, _dir) = test_store().await;
        let alice = sample_account("alice", "alice@example.com");
        let bob = sample_account("bob", "bob@example.com");
        store.insert_account(&alice).await.unwrap();
        store.insert_account(&bob).await.unwrap();
        let now = Utc::now();
        let expires = now + chrono::Duration::days(7);

        store.replace_refresh_session(&alice.id, "alice-token", expires, now).await.unwrap();
        store.replace_refresh_session(&bob.id, "bob-token", expires, now).await.unwrap();
        // Replacing Alice's session leaves Bob's untouched.
        store.replace_refresh_session(&alice.id, "alice-token-2", expires, now).await.unwrap();

        assert!(store.find_session_by_token("bob-token").await.unwrap().is_some());
        assert!(store.find_session_by_token("alice-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_session_reports_whether_it_matched() {
        let (store, _dir) = test_store().await;
        let alice = sample_account("alice", "alice@example.com");
        store.insert_account(&alice).await.unwrap();
        let now = Utc::now();
        store
            .replace_refresh_session(&alice.id, "token-one", now + chrono::Duration::days(7), now)
            .await
            .unwrap();

        assert!(store.delete_session_by_token("token-one").await.unwrap());
        assert!(!store.delete_session_by_token("token-one").await.unwrap());
    }

    #[tokio::test]
    async fn expired_sweep_only_removes_stale_sessions() {
        let (store, _dir) = test_store().await;
        let alice = sample_account("alice", "alice@example.com");
        let bob = sample_account("bob", "bob@example.com");
        store.insert_account(&alice).await.unwrap();
        store.insert_account(&bob).await.unwrap();
        let now = Utc::now();

        store
            .replace_refresh_session(&alice.id, "stale", now - chrono::Duration::hours(1), now)
            .await
            .unwrap();
        store
            .replace_refresh_session(&bob.id, "live", now + chrono::Duration::hours(1), now)
            .await
            .unwrap();

        let removed = store.delete_expired_sessions(now).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.find_session_by_token("stale").await.unwrap().is_none());
        assert!(store.find_session_by_token("live").await.unwrap().is_some());
    }
}
