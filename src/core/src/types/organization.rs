//! Organization tree types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Department identifier
pub type DepartmentId = String;

/// A department node of the organization tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,

    #[serde(default)]
    pub name: String,

    /// Strict ancestors, root first, excluding the department itself
    #[serde(default)]
    pub ancestor_ids: Vec<DepartmentId>,
}

impl Department {
    pub fn new(id: impl Into<DepartmentId>, ancestor_ids: Vec<DepartmentId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            ancestor_ids,
        }
    }

    /// Ancestors plus the department itself
    pub fn closure(&self) -> HashSet<DepartmentId> {
        let mut ids: HashSet<DepartmentId> = self.ancestor_ids.iter().cloned().collect();
        ids.insert(self.id.clone());
        ids
    }
}
