//! Incremental merge of grantable actions
//!
//! Merging accumulates: an incoming condition is appended unless the same
//! restriction is already listed. Conditions that overlap without being equal
//! (a wildcard path next to concrete paths it already covers) are kept side by
//! side.

use iamscope_core::{Policy, RelatedResourceType, ALL};

/// Merge `incoming` actions into `existing`, per action id
///
/// An action that is unconditional on either side stays unconditional. When
/// either side holds the every-action sentinel the result is that sentinel
/// alone.
pub fn merge_incremental_scope(existing: Vec<Policy>, incoming: Vec<Policy>) -> Vec<Policy> {
    if existing
        .iter()
        .chain(incoming.iter())
        .any(|p| p.action_id == ALL)
    {
        return vec![Policy::unconditional(ALL)];
    }

    let mut merged = existing;
    for policy in incoming {
        match merged.iter_mut().find(|p| p.action_id == policy.action_id) {
            Some(current) => merge_policy(current, policy),
            None => merged.push(policy),
        }
    }
    merged
}

fn merge_policy(current: &mut Policy, incoming: Policy) {
    for rrt in incoming.related_resource_types {
        let existing = current
            .related_resource_types
            .iter_mut()
            .find(|r| r.is(&rrt.system_id, &rrt.resource_type));

        match existing {
            Some(existing) => merge_resource_type(existing, rrt),
            None => current.related_resource_types.push(rrt),
        }
    }
}

fn merge_resource_type(current: &mut RelatedResourceType, incoming: RelatedResourceType) {
    // an empty condition list is unrestricted and absorbs everything
    if current.condition.is_empty() {
        return;
    }
    if incoming.condition.is_empty() {
        current.condition.clear();
        return;
    }

    for condition in incoming.condition {
        if !current
            .condition
            .iter()
            .any(|c| c.same_restriction(&condition))
        {
            current.condition.push(condition);
        }
    }
}
