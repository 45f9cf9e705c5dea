//! Shared types for the scope engine

pub mod role;
pub mod policy;
pub mod scope;
pub mod subject;
pub mod organization;

// Re-export commonly used types
pub use role::{PermissionCode, Role, RoleId, RoleType};
pub use policy::{
    Attribute, AttributeValue, Condition, ConditionShape, Instance, PathNode, Policy,
    RelatedResourceType,
};
pub use scope::{AuthScope, AuthScopeSystem, Scope, ALL};
pub use subject::{Subject, SubjectType};
pub use organization::{Department, DepartmentId};
