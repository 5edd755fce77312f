//! Identity and access subsystem.
//!
//! ```text
//! auth/
//! ├── types.rs        # accounts, roles, request/response DTOs
//! ├── errors.rs       # error taxonomy and HTTP mapping
//! ├── config.rs       # environment-driven configuration
//! ├── validation.rs   # request field validation
//! ├── store.rs        # SQLite persistence
//! ├── service.rs      # authentication facade
//! ├── approval.rs     # privilege escalation workflow
//! ├── linker.rs       # federated identity reconciliation
//! ├── bootstrap.rs    # role registry and default admin seeding
//! └── core/           # token and password primitives
//!     ├── token_service.rs
//!     └── password_service.rs
//! ```
//!
//! Handlers depend on [`AuthService`] only; everything else is wiring.

pub mod approval;
pub mod bootstrap;
pub mod config;
pub mod core;
pub mod errors;
pub mod linker;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

pub use config::AuthConfig;
pub use errors::{AuthError, DuplicateField};
pub use service::AuthService;
pub use store::IdentityStore;
pub use types::{
    Account, AccountStatus, AccountView, AuthResponse, DecisionRequest, EscalationRequest,
    FederatedAssertion, LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest, Role,
};
