//! Resource path canonicalization and prefix containment
//!
//! A path `[(cmdb, biz, 1), (cmdb, set, 2)]` canonicalizes to
//! `cmdb,biz,1/cmdb,set,2/`. A scope path whose last node is the `*`
//! wildcard authorizes every descendant of its parent, so the trailing `*/`
//! is dropped before prefix comparison: `cmdb,biz,1/cmdb,set,*/` becomes
//! `cmdb,biz,1/cmdb,set,`.

use iamscope_core::PathNode;

/// Separates fields inside one node
const FIELD_SEPARATOR: char = ',';

/// Terminates every node
const NODE_TERMINATOR: char = '/';

/// Canonical tail of a wildcard node
const ANY_SUFFIX: &str = ",*/";

/// Renders a path as `system,type,id/` per node
pub fn canonicalize(path: &[PathNode]) -> String {
    let mut out = String::with_capacity(path.len() * 24);
    for node in path {
        out.push_str(&node.system_id);
        out.push(FIELD_SEPARATOR);
        out.push_str(&node.node_type);
        out.push(FIELD_SEPARATOR);
        out.push_str(&node.id);
        out.push(NODE_TERMINATOR);
    }
    out
}

/// Canonical form of a scope path, with a trailing wildcard stripped
pub fn scope_prefix(path: &[PathNode]) -> String {
    let mut prefix = canonicalize(path);
    if prefix.ends_with(ANY_SUFFIX) {
        // keep the trailing field separator so sibling types cannot match
        prefix.truncate(prefix.len() - 2);
    }
    prefix
}

/// Whether `candidate` equals or descends from one of `scope_paths`
pub fn contains(candidate: &[PathNode], scope_paths: &ScopePaths) -> bool {
    scope_paths.contains(candidate)
}

/// A set of scope paths prepared for repeated prefix matching
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopePaths {
    prefixes: Vec<String>,
}

impl ScopePaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepares every path yielded by `paths`
    pub fn from_paths<'a, I>(paths: I) -> Self
    where
        I: IntoIterator<Item = &'a [PathNode]>,
    {
        let mut scope_paths = Self::new();
        for path in paths {
            scope_paths.push(path);
        }
        scope_paths
    }

    /// Adds one scope path
    pub fn push(&mut self, path: &[PathNode]) {
        self.prefixes.push(scope_prefix(path));
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Canonical, wildcard-stripped prefixes
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Whether `candidate` starts with any prepared prefix
    pub fn contains(&self, candidate: &[PathNode]) -> bool {
        self.contains_canonical(&canonicalize(candidate))
    }

    /// Same as [`ScopePaths::contains`] for an already canonical candidate
    pub fn contains_canonical(&self, candidate: &str) -> bool {
        self.prefixes.iter().any(|p| candidate.starts_with(p.as_str()))
    }
}
