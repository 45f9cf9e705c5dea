//! Authorization scope types
//!
//! Stored scopes use the `*` sentinel for "every system" and "every action".
//! Code that reasons about scopes converts the sentinel into [`Scope`] so
//! that no comparison against the raw string leaks past the loader.

use serde::{Deserialize, Serialize};

use super::policy::Policy;

/// Sentinel id meaning "all" for systems, actions and subjects
pub const ALL: &str = "*";

/// Either everything or a specific set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope<T> {
    /// No restriction
    Unlimited,
    /// Restricted to the given value
    Specific(T),
}

impl<T> Scope<T> {
    /// Whether this scope is unrestricted
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Scope::Unlimited)
    }

    /// The restricted value, if any
    pub fn as_specific(&self) -> Option<&T> {
        match self {
            Scope::Unlimited => None,
            Scope::Specific(value) => Some(value),
        }
    }

    /// Map the restricted value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Scope<U> {
        match self {
            Scope::Unlimited => Scope::Unlimited,
            Scope::Specific(value) => Scope::Specific(f(value)),
        }
    }
}

/// Grantable actions of one system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthScopeSystem {
    /// System id, or `*` for every system
    pub system_id: String,

    /// Grantable actions with their resource conditions
    #[serde(default)]
    pub actions: Vec<Policy>,
}

impl AuthScopeSystem {
    pub fn new(system_id: impl Into<String>, actions: Vec<Policy>) -> Self {
        Self {
            system_id: system_id.into(),
            actions,
        }
    }

    /// Entry granting every system
    pub fn all() -> Self {
        Self::new(ALL, Vec::new())
    }

    /// Whether this entry is the every-system sentinel
    pub fn is_all(&self) -> bool {
        self.system_id == ALL
    }

    /// Whether this system grants every action
    pub fn has_all_actions(&self) -> bool {
        self.actions.iter().any(|a| a.action_id == ALL)
    }
}

/// A role's full authorization scope
pub type AuthScope = Vec<AuthScopeSystem>;
