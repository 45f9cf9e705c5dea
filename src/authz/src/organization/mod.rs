//! Organization hierarchy collaborator
//!
//! The subject checker asks two batched questions: which departments a set of
//! users joined directly, and what the ancestor closure of a set of
//! departments is. Implementations must accept whole id sets so a check costs
//! a bounded number of round-trips regardless of how many subjects it covers.

mod cache;

pub use cache::{CacheStats, CachedOrganizationResolver};

use crate::error::Result;
use async_trait::async_trait;
use iamscope_core::{Department, DepartmentId, Username};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Resolves department ancestry and user membership
#[async_trait]
pub trait OrganizationResolver: Send + Sync {
    /// Ancestor closure (ancestors plus self) of each known department
    async fn ancestor_departments(
        &self,
        department_ids: &HashSet<DepartmentId>,
    ) -> Result<HashMap<DepartmentId, HashSet<DepartmentId>>>;

    /// Departments each known user joined directly
    async fn direct_departments(
        &self,
        usernames: &HashSet<Username>,
    ) -> Result<HashMap<Username, HashSet<DepartmentId>>>;
}

/// In-memory organization tree
///
/// Built once, then read-only. Counts resolver calls so callers can observe
/// batching.
#[derive(Debug, Default)]
pub struct InMemoryOrganization {
    departments: HashMap<DepartmentId, Department>,
    members: HashMap<Username, HashSet<DepartmentId>>,
    ancestor_calls: AtomicUsize,
    membership_calls: AtomicUsize,
}

impl InMemoryOrganization {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a department
    pub fn with_department(mut self, department: Department) -> Self {
        self.departments.insert(department.id.clone(), department);
        self
    }

    /// Add a direct membership of `username` in `department_id`
    pub fn with_member(
        mut self,
        username: impl Into<Username>,
        department_id: impl Into<DepartmentId>,
    ) -> Self {
        self.members
            .entry(username.into())
            .or_default()
            .insert(department_id.into());
        self
    }

    /// Number of `ancestor_departments` calls served
    pub fn ancestor_calls(&self) -> usize {
        self.ancestor_calls.load(Ordering::Relaxed)
    }

    /// Number of `direct_departments` calls served
    pub fn membership_calls(&self) -> usize {
        self.membership_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl OrganizationResolver for InMemoryOrganization {
    async fn ancestor_departments(
        &self,
        department_ids: &HashSet<DepartmentId>,
    ) -> Result<HashMap<DepartmentId, HashSet<DepartmentId>>> {
        self.ancestor_calls.fetch_add(1, Ordering::Relaxed);

        Ok(department_ids
            .iter()
            .filter_map(|id| self.departments.get(id))
            .map(|d| (d.id.clone(), d.closure()))
            .collect())
    }

    async fn direct_departments(
        &self,
        usernames: &HashSet<Username>,
    ) -> Result<HashMap<Username, HashSet<DepartmentId>>> {
        self.membership_calls.fetch_add(1, Ordering::Relaxed);

        Ok(usernames
            .iter()
            .filter_map(|u| self.members.get(u).map(|ds| (u.clone(), ds.clone())))
            .collect())
    }
}
