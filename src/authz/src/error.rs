//! Error types for the scope engine

use iamscope_core::Subject;
use thiserror::Error;

/// Why a candidate falls outside a role's scope
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// Staff roles never hold a grantable scope
    #[error("staff roles cannot grant permissions")]
    StaffRole,

    #[error("system {system_id} is not in the role's authorization scope")]
    SystemNotInScope { system_id: String },

    #[error("action {action_id} of system {system_id} is not in the role's authorization scope")]
    ActionNotInScope { system_id: String, action_id: String },

    #[error("resource conditions of action {action_id} exceed the role's authorization scope")]
    ConditionNotSatisfied { system_id: String, action_id: String },

    #[error("{subject} is not in the role's subject scope")]
    SubjectNotInScope { subject: Subject },
}

/// Scope engine errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The candidate is not contained in the scope
    #[error("Forbidden: {0}")]
    Forbidden(#[from] Violation),

    /// Stored scope data is malformed
    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    /// A store or resolver could not answer
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AuthzError {
    /// Whether the caller was refused, as opposed to the decision failing
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthzError::Forbidden(_))
    }

    /// Whether a collaborator failed or timed out
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AuthzError::Unavailable(_))
    }

    /// The violation behind a `Forbidden` error
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            AuthzError::Forbidden(v) => Some(v),
            _ => None,
        }
    }
}

/// Result type for scope operations
pub type Result<T> = std::result::Result<T, AuthzError>;
