//! Subject types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::scope::ALL;

/// Kind of subject a permission can be granted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    User,
    Department,
    /// The universal principal; only meaningful with id `*`
    #[serde(rename = "*")]
    All,
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectType::User => f.write_str("user"),
            SubjectType::Department => f.write_str("department"),
            SubjectType::All => f.write_str(ALL),
        }
    }
}

/// A user, a department, or everyone
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    #[serde(rename = "type")]
    pub subject_type: SubjectType,

    pub id: String,
}

impl Subject {
    pub fn new(subject_type: SubjectType, id: impl Into<String>) -> Self {
        Self {
            subject_type,
            id: id.into(),
        }
    }

    pub fn user(username: impl Into<String>) -> Self {
        Self::new(SubjectType::User, username)
    }

    pub fn department(id: impl Into<String>) -> Self {
        Self::new(SubjectType::Department, id)
    }

    /// The `(*, *)` subject covering everyone
    pub fn all() -> Self {
        Self::new(SubjectType::All, ALL)
    }

    /// Whether this is the `(*, *)` subject
    pub fn is_all(&self) -> bool {
        self.subject_type == SubjectType::All && self.id == ALL
    }

    /// Remove repeated `(type, id)` pairs, keeping first occurrences in order
    pub fn dedup(subjects: Vec<Subject>) -> Vec<Subject> {
        let mut seen = HashSet::with_capacity(subjects.len());
        subjects
            .into_iter()
            .filter(|s| seen.insert((s.subject_type, s.id.clone())))
            .collect()
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.subject_type, self.id)
    }
}
