//! Scope containment algorithms
//!
//! Pure functions over in-memory scope data: resource path matching,
//! condition containment and incremental scope merging. Nothing in this
//! module performs I/O.
//!
//! # Examples
//!
//! ```
//! use iamscope_authz::scope::{contains, ScopePaths};
//! use iamscope_core::PathNode;
//!
//! let scope = ScopePaths::from_paths([vec![
//!     PathNode::new("cmdb", "biz", "1"),
//!     PathNode::new("cmdb", "host", "*"),
//! ]
//! .as_slice()]);
//!
//! let host = vec![PathNode::new("cmdb", "biz", "1"), PathNode::new("cmdb", "host", "7")];
//! assert!(contains(&host, &scope));
//! ```

mod path;
mod differ;
mod merge;

#[cfg(test)]
mod tests;

pub use path::{canonicalize, contains, scope_prefix, ScopePaths};
pub use differ::{
    attributes_contained, condition_contained, conditions_contained, instances_contained,
    policy_contained,
};
pub use merge::merge_incremental_scope;
