//! Scope checkers
//!
//! A checker is bound to one role. It loads the role's scope once at
//! construction and answers every later question from that snapshot.

mod auth_scope;
mod subject_scope;

pub use auth_scope::{ActionMatch, AuthScopeChecker};
pub use subject_scope::{role_scope_includes_user, SubjectScopeChecker, ViolationMode};
