//! Subject scope checker
//!
//! A role may only grant to the users and departments of its subject scope.
//! A department in scope covers its whole subtree, and a user is covered when
//! any department they joined directly lies in such a subtree.
//!
//! Candidates that are not literally in scope are resolved in two batched
//! rounds: one membership lookup for every user, then one ancestor lookup for
//! every department involved. The number of resolver calls per check is
//! therefore at most two regardless of the candidate count.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use iamscope_core::{DepartmentId, Role, Subject, SubjectType, Username};
use tracing::{debug, info, warn};

use crate::config::CheckerConfig;
use crate::error::{Result, Violation};
use crate::organization::OrganizationResolver;
use crate::store::{bounded, ScopeStore};

/// What to do with a subject outside the scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationMode {
    /// Fail the whole check on the first violating subject
    Raise,
    /// Drop violating subjects from the result
    Exclude,
}

/// Checks candidate subjects against one role's subject scope
pub struct SubjectScopeChecker {
    role: Role,
    unlimited: bool,
    literal: HashSet<Subject>,
    departments: HashSet<DepartmentId>,
    resolver: Arc<dyn OrganizationResolver>,
    resolver_timeout: Duration,
}

impl SubjectScopeChecker {
    /// Load the role's subject scope from `store`
    pub async fn load(
        role: &Role,
        store: &dyn ScopeStore,
        resolver: Arc<dyn OrganizationResolver>,
        config: &CheckerConfig,
    ) -> Result<Self> {
        if role.is_staff() {
            return Err(Violation::StaffRole.into());
        }

        let subjects = bounded(
            config.store_timeout(),
            "subject scope load",
            store.load_subject_scope(role.id),
        )
        .await?;

        info!("Loaded subject scope of role {} ({} subjects)", role.id, subjects.len());
        Self::from_scope(role.clone(), subjects, resolver, config.resolver_timeout())
    }

    /// Build a checker from an already materialized subject scope
    pub fn from_scope(
        role: Role,
        subjects: Vec<Subject>,
        resolver: Arc<dyn OrganizationResolver>,
        resolver_timeout: Duration,
    ) -> Result<Self> {
        if role.is_staff() {
            return Err(Violation::StaffRole.into());
        }

        let unlimited = subjects.iter().any(Subject::is_all);
        let departments = subjects
            .iter()
            .filter(|s| s.subject_type == SubjectType::Department)
            .map(|s| s.id.clone())
            .collect();

        Ok(Self {
            role,
            unlimited,
            literal: subjects.into_iter().collect(),
            departments,
            resolver,
            resolver_timeout,
        })
    }

    /// The role this checker is bound to
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Check `subjects` against the scope
    ///
    /// Returns the subjects inside the scope in input order. With
    /// [`ViolationMode::Raise`] the first violating subject fails the check
    /// with `Forbidden(SubjectNotInScope)` instead.
    pub async fn check(&self, subjects: Vec<Subject>, mode: ViolationMode) -> Result<Vec<Subject>> {
        if self.unlimited {
            return Ok(subjects);
        }

        let pending: Vec<&Subject> = subjects
            .iter()
            .filter(|s| !self.literal.contains(*s))
            .collect();

        let covered = if pending.is_empty() || self.departments.is_empty() {
            HashSet::new()
        } else {
            self.resolve_covered(&pending).await?
        };

        let mut kept = Vec::with_capacity(subjects.len());
        for subject in subjects {
            if self.literal.contains(&subject) || covered.contains(&subject) {
                kept.push(subject);
                continue;
            }

            match mode {
                ViolationMode::Raise => {
                    debug!("Subject {} outside scope of role {}", subject, self.role.id);
                    return Err(Violation::SubjectNotInScope { subject }.into());
                }
                ViolationMode::Exclude => {
                    warn!("Dropping {} outside subject scope of role {}", subject, self.role.id);
                }
            }
        }

        Ok(kept)
    }

    /// Which of the non-literal candidates fall under a scope department
    async fn resolve_covered(&self, pending: &[&Subject]) -> Result<HashSet<Subject>> {
        let usernames: HashSet<Username> = pending
            .iter()
            .filter(|s| s.subject_type == SubjectType::User)
            .map(|s| s.id.clone())
            .collect();

        let memberships = if usernames.is_empty() {
            HashMap::new()
        } else {
            bounded(
                self.resolver_timeout,
                "direct department lookup",
                self.resolver.direct_departments(&usernames),
            )
            .await?
        };

        let mut department_ids: HashSet<DepartmentId> = pending
            .iter()
            .filter(|s| s.subject_type == SubjectType::Department)
            .map(|s| s.id.clone())
            .collect();
        department_ids.extend(memberships.values().flatten().cloned());

        let closures = if department_ids.is_empty() {
            HashMap::new()
        } else {
            bounded(
                self.resolver_timeout,
                "ancestor department lookup",
                self.resolver.ancestor_departments(&department_ids),
            )
            .await?
        };

        debug!(
            "Resolved {} users and {} departments for role {}",
            usernames.len(),
            department_ids.len(),
            self.role.id
        );

        let in_scope = |department_id: &DepartmentId| {
            closures
                .get(department_id)
                .is_some_and(|closure| !closure.is_disjoint(&self.departments))
        };

        Ok(pending
            .iter()
            .filter(|s| match s.subject_type {
                SubjectType::Department => in_scope(&s.id),
                SubjectType::User => memberships
                    .get(&s.id)
                    .is_some_and(|direct| direct.iter().any(|d| in_scope(d))),
                SubjectType::All => false,
            })
            .map(|s| (*s).clone())
            .collect())
    }
}

/// Whether `username` falls in the subject scope of `role`
///
/// Scope violations, including staff roles, yield `false`; collaborator
/// failures are propagated.
pub async fn role_scope_includes_user(
    role: &Role,
    username: &str,
    store: &dyn ScopeStore,
    resolver: Arc<dyn OrganizationResolver>,
    config: &CheckerConfig,
) -> Result<bool> {
    let outcome = match SubjectScopeChecker::load(role, store, resolver, config).await {
        Ok(checker) => {
            checker
                .check(vec![Subject::user(username)], ViolationMode::Raise)
                .await
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(_) => Ok(true),
        Err(e) if e.is_forbidden() => Ok(false),
        Err(e) => Err(e),
    }
}
