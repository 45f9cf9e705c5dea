//! Authorization scope checker
//!
//! Loads a role's authorization scope once and answers whether systems,
//! actions and policies fall inside it.

use std::collections::{BTreeSet, HashMap};

use iamscope_core::{AuthScope, PathNode, Policy, Role, Scope, ALL};
use tracing::{debug, info};

use crate::config::CheckerConfig;
use crate::error::{AuthzError, Result, Violation};
use crate::scope::{policy_contained, ScopePaths};
use crate::store::{bounded, ScopeStore};

type ActionIndex = HashMap<String, Policy>;
type SystemIndex = HashMap<String, Scope<ActionIndex>>;

/// How an action is covered by the scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMatch<'a> {
    /// Every resource of the action may be granted
    Unlimited,
    /// Resources are bounded by the scope's own policy for the action
    Conditional(&'a Policy),
}

impl ActionMatch<'_> {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, ActionMatch::Unlimited)
    }
}

/// Checks candidates against one role's authorization scope
///
/// The scope is read once at construction; later changes to the stored scope
/// are not observed by an existing checker.
#[derive(Debug)]
pub struct AuthScopeChecker {
    role: Role,
    systems: Scope<SystemIndex>,
}

impl AuthScopeChecker {
    /// Load the role's scope from `store`
    ///
    /// # Errors
    ///
    /// - `Forbidden(StaffRole)` for staff roles, before any store access
    /// - `Unavailable` when the store fails or times out
    /// - `InvalidScope` when the stored scope is malformed
    pub async fn load(role: &Role, store: &dyn ScopeStore, config: &CheckerConfig) -> Result<Self> {
        if role.is_staff() {
            return Err(Violation::StaffRole.into());
        }

        let scope = bounded(
            config.store_timeout(),
            "authorization scope load",
            store.load_auth_scope(role.id),
        )
        .await?;

        info!("Loaded authorization scope of role {} ({} systems)", role.id, scope.len());
        Self::from_scope(role.clone(), scope)
    }

    /// Build a checker from an already materialized scope
    pub fn from_scope(role: Role, scope: AuthScope) -> Result<Self> {
        if role.is_staff() {
            return Err(Violation::StaffRole.into());
        }

        let systems = build_index(scope)?;
        Ok(Self { role, systems })
    }

    /// The role this checker is bound to
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Fails unless `system_id` is in scope
    pub fn check_system_in_scope(&self, system_id: &str) -> Result<()> {
        match &self.systems {
            Scope::Unlimited => Ok(()),
            Scope::Specific(systems) if systems.contains_key(system_id) => Ok(()),
            Scope::Specific(_) => Err(Violation::SystemNotInScope {
                system_id: system_id.to_string(),
            }
            .into()),
        }
    }

    /// Classify how `action_id` of `system_id` is covered
    pub fn action_in_scope(&self, system_id: &str, action_id: &str) -> Result<ActionMatch<'_>> {
        let systems = match &self.systems {
            Scope::Unlimited => return Ok(ActionMatch::Unlimited),
            Scope::Specific(systems) => systems,
        };

        let actions = match systems.get(system_id) {
            None => {
                return Err(Violation::SystemNotInScope {
                    system_id: system_id.to_string(),
                }
                .into())
            }
            Some(Scope::Unlimited) => return Ok(ActionMatch::Unlimited),
            Some(Scope::Specific(actions)) => actions,
        };

        actions
            .get(action_id)
            .map(ActionMatch::Conditional)
            .ok_or_else(|| {
                Violation::ActionNotInScope {
                    system_id: system_id.to_string(),
                    action_id: action_id.to_string(),
                }
                .into()
            })
    }

    fn check_policy_in_scope(&self, system_id: &str, policy: &Policy) -> Result<()> {
        let scope_policy = match self.action_in_scope(system_id, &policy.action_id)? {
            ActionMatch::Unlimited => return Ok(()),
            ActionMatch::Conditional(scope_policy) => scope_policy,
        };

        if policy_contained(policy, scope_policy) {
            Ok(())
        } else {
            debug!(
                "Policy {} of system {} exceeds scope of role {}",
                policy.action_id, system_id, self.role.id
            );
            Err(Violation::ConditionNotSatisfied {
                system_id: system_id.to_string(),
                action_id: policy.action_id.clone(),
            }
            .into())
        }
    }

    /// Fails on the first policy not contained in the scope
    pub fn check_policies(&self, system_id: &str, policies: &[Policy]) -> Result<()> {
        self.check_system_in_scope(system_id)?;
        for policy in policies {
            self.check_policy_in_scope(system_id, policy)?;
        }
        Ok(())
    }

    /// Policies not contained in the scope, in input order
    ///
    /// When the whole system is out of scope every policy is returned.
    pub fn list_not_match_policies(&self, system_id: &str, policies: &[Policy]) -> Vec<Policy> {
        if self.check_system_in_scope(system_id).is_err() {
            return policies.to_vec();
        }

        policies
            .iter()
            .filter(|p| self.check_policy_in_scope(system_id, p).is_err())
            .cloned()
            .collect()
    }

    /// Fails on the first system not in scope
    pub fn check_systems<S: AsRef<str>>(&self, system_ids: &[S]) -> Result<()> {
        for system_id in system_ids {
            self.check_system_in_scope(system_id.as_ref())?;
        }
        Ok(())
    }

    /// Fails on the first action of `system_id` not in scope
    pub fn check_actions<S: AsRef<str>>(&self, system_id: &str, action_ids: &[S]) -> Result<()> {
        self.check_system_in_scope(system_id)?;
        for action_id in action_ids {
            self.action_in_scope(system_id, action_id.as_ref())?;
        }
        Ok(())
    }

    /// Keep only the candidate paths inside the action's scope
    ///
    /// Each related resource type of the scope policy narrows the remaining
    /// paths in turn. Attribute restrictions are ignored. A resource type
    /// without conditions contributes no scope paths, so it removes every
    /// candidate even though [`check_policies`](Self::check_policies) accepts
    /// them.
    pub fn remove_path_outside_scope(
        &self,
        system_id: &str,
        action_id: &str,
        paths: Vec<Vec<PathNode>>,
    ) -> Result<Vec<Vec<PathNode>>> {
        let scope_policy = match self.action_in_scope(system_id, action_id)? {
            ActionMatch::Unlimited => return Ok(paths),
            ActionMatch::Conditional(scope_policy) => scope_policy,
        };

        let mut remaining = paths;
        for rrt in &scope_policy.related_resource_types {
            let scope_paths = ScopePaths::from_paths(rrt.paths());
            remaining.retain(|path| scope_paths.contains(path));
        }
        Ok(remaining)
    }

    /// Systems in scope
    pub fn scope_systems(&self) -> Scope<BTreeSet<String>> {
        match &self.systems {
            Scope::Unlimited => Scope::Unlimited,
            Scope::Specific(systems) => Scope::Specific(systems.keys().cloned().collect()),
        }
    }

    /// Keep the systems of `system_ids` that are in scope, in input order
    pub fn list_systems<S: AsRef<str> + Clone>(&self, system_ids: &[S]) -> Vec<S> {
        system_ids
            .iter()
            .filter(|id| self.check_system_in_scope(id.as_ref()).is_ok())
            .cloned()
            .collect()
    }

    /// Grantable action ids of `system_id`; empty when the system is out of scope
    pub fn scope_action_ids(&self, system_id: &str) -> Scope<BTreeSet<String>> {
        let systems = match &self.systems {
            Scope::Unlimited => return Scope::Unlimited,
            Scope::Specific(systems) => systems,
        };

        match systems.get(system_id) {
            None => Scope::Specific(BTreeSet::new()),
            Some(Scope::Unlimited) => Scope::Unlimited,
            Some(Scope::Specific(actions)) => Scope::Specific(actions.keys().cloned().collect()),
        }
    }
}

/// Turn the stored scope into the lookup index, rejecting malformed data
fn build_index(scope: AuthScope) -> Result<Scope<SystemIndex>> {
    for system in &scope {
        if let Some(action) = system
            .actions
            .iter()
            .find(|a| a.action_id == ALL && a.has_conditions())
        {
            return Err(AuthzError::InvalidScope(format!(
                "system {} grants every action but also restricts {} resource types",
                system.system_id,
                action.related_resource_types.len()
            )));
        }
    }

    if scope.iter().any(|s| s.is_all()) {
        return Ok(Scope::Unlimited);
    }

    let mut systems = SystemIndex::with_capacity(scope.len());
    for system in scope {
        if systems.contains_key(&system.system_id) {
            return Err(AuthzError::InvalidScope(format!(
                "system {} appears more than once",
                system.system_id
            )));
        }

        let actions = if system.has_all_actions() {
            Scope::Unlimited
        } else {
            let mut actions = ActionIndex::with_capacity(system.actions.len());
            for action in system.actions {
                if actions.contains_key(&action.action_id) {
                    return Err(AuthzError::InvalidScope(format!(
                        "action {} of system {} appears more than once",
                        action.action_id, system.system_id
                    )));
                }
                actions.insert(action.action_id.clone(), action);
            }
            Scope::Specific(actions)
        };

        systems.insert(system.system_id, actions);
    }

    Ok(Scope::Specific(systems))
}
