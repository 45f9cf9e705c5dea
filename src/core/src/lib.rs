//! # iamscope Core
//!
//! Shared data model for the permission-scope engine: roles, subjects,
//! departments, policies and the authorization scopes that bound them.
//! Kept free of I/O so that every crate in the workspace can depend on it.

pub mod types;

// Re-export commonly used types
pub use types::{
    Attribute, AttributeValue, AuthScope, AuthScopeSystem, Condition, ConditionShape,
    Department, DepartmentId, Instance, PathNode, PermissionCode, Policy,
    RelatedResourceType, Role, RoleId, RoleType, Scope, Subject, SubjectType, ALL,
};

// Type aliases shared by the engine and its collaborators
pub type SystemId = String;
pub type ActionId = String;
pub type Username = String;
