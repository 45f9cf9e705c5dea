//! # iamscope Authz
//!
//! Scope containment engine for delegated permission management.
//!
//! A manager role may only hand out permissions that lie inside its own
//! authorization scope, and only to subjects inside its subject scope. This
//! crate answers both questions:
//!
//! - **Authorization scope**: [`AuthScopeChecker`] decides whether systems,
//!   actions and policies (with their resource conditions) are contained in
//!   a role's scope, and trims resource paths to it.
//! - **Subject scope**: [`SubjectScopeChecker`] decides whether users and
//!   departments fall inside a role's subject scope, following the
//!   organization hierarchy.
//! - **Incremental update**: [`ScopeUpdater`] widens a stored scope and
//!   records an audit entry.
//!
//! ## Example
//!
//! ```no_run
//! use iamscope_authz::{AuthScopeChecker, CheckerConfig, InMemoryScopeStore};
//! use iamscope_core::{AuthScopeSystem, Policy, Role, RoleType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryScopeStore::new();
//!     store
//!         .set_auth_scope(1, vec![AuthScopeSystem::new("cmdb", vec![Policy::unconditional("view_host")])])
//!         .await;
//!
//!     let role = Role::new(1, "ops", RoleType::RatingManager);
//!     let checker = AuthScopeChecker::load(&role, &store, &CheckerConfig::default()).await?;
//!
//!     checker.check_policies("cmdb", &[Policy::unconditional("view_host")])?;
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod checker;
pub mod config;
pub mod error;
pub mod organization;
pub mod scope;
pub mod store;
pub mod updater;

// Re-export main types
pub use audit::{AuditAction, AuditRecord, AuditSink, InMemoryAuditSink};
pub use checker::{
    role_scope_includes_user, ActionMatch, AuthScopeChecker, SubjectScopeChecker, ViolationMode,
};
pub use config::CheckerConfig;
pub use error::{AuthzError, Result, Violation};
pub use organization::{CacheStats, CachedOrganizationResolver, InMemoryOrganization, OrganizationResolver};
pub use store::{InMemoryScopeStore, ScopeStore};
pub use updater::ScopeUpdater;
