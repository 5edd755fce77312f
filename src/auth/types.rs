//! Identity domain types and API payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability tier. Declaration order is the hierarchy: `Guest` is the
/// lowest tier, `Admin` the highest, so `Ord` compares tiers directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Guest,
    NormalUser,
    SuperUser,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Guest, Role::NormalUser, Role::SuperUser, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "GUEST",
            Role::NormalUser => "NORMAL_USER",
            Role::SuperUser => "SUPER_USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GUEST" => Some(Role::Guest),
            "NORMAL_USER" => Some(Role::NormalUser),
            "SUPER_USER" => Some(Role::SuperUser),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Seed description for the role registry.
    pub fn description(&self) -> &'static str {
        match self {
            Role::Guest => "Guest users with limited read-only access",
            Role::NormalUser => "Regular users with standard application access",
            Role::SuperUser => "Approved users with read-only access to everything",
            Role::Admin => "Administrators with full system access",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account lifecycle state driven by the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    PendingApproval,
    Approved,
    Rejected,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::PendingApproval => "PENDING_APPROVAL",
            AccountStatus::Approved => "APPROVED",
            AccountStatus::Rejected => "REJECTED",
            AccountStatus::Suspended => "SUSPENDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING_APPROVAL" => Some(AccountStatus::PendingApproval),
            "APPROVED" => Some(AccountStatus::Approved),
            "REJECTED" => Some(AccountStatus::Rejected),
            "SUSPENDED" => Some(AccountStatus::Suspended),
            _ => None,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registrable principal.
///
/// `password_hash` stays empty for federated-only accounts; those can never
/// authenticate through the password path. This struct is internal: the
/// serialized shape is [`AccountView`], which never carries the hash.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub enabled: bool,
    pub status: AccountStatus,
    pub role: Role,
    /// Set only while an escalation request is in flight.
    pub requested_role: Option<Role>,
    pub approval_notes: Option<String>,
    /// Id of the deciding admin, once a decision was made.
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    /// Federated identity subject (e.g. the OAuth `sub`).
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The single live refresh credential of an account.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSession {
    pub account_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Caller-visible projection of an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub enabled: bool,
    pub status: AccountStatus,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountView {
    fn from(a: Account) -> Self {
        AccountView {
            id: a.id,
            username: a.username,
            email: a.email,
            enabled: a.enabled,
            status: a.status,
            role: a.role,
            requested_role: a.requested_role,
            approval_notes: a.approval_notes,
            approved_by: a.approved_by,
            approved_at: a.approved_at,
            external_id: a.external_id,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// Registration request (self-service).
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request. Login is by username only.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Logout body; the token is optional and logout succeeds either way.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Privilege-escalation request (registers a pending super-user account).
#[derive(Debug, Deserialize)]
pub struct EscalationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub justification: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

/// Admin decision on a pending escalation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub account_id: String,
    pub approved: bool,
    #[serde(default)]
    pub approval_notes: Option<String>,
}

/// Externally-verified identity assertion. Verification happened upstream;
/// this core only reconciles it with a local account. `name` and `picture`
/// are accepted for wire compatibility but not persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct FederatedAssertion {
    pub subject: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Token pair plus the resolved account, returned by every login-shaped
/// operation (register, login, refresh, federated login).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub account: AccountView,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}
