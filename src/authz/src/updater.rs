//! Incremental updates of authorization scopes

use std::sync::Arc;
use std::time::Duration;

use iamscope_core::{AuthScopeSystem, Policy, Role};
use tracing::{debug, info};

use crate::audit::{AuditAction, AuditRecord, AuditSink};
use crate::config::CheckerConfig;
use crate::error::{Result, Violation};
use crate::scope::merge_incremental_scope;
use crate::store::{bounded, ScopeStore};

/// Widens stored authorization scopes and audits every change
pub struct ScopeUpdater {
    store: Arc<dyn ScopeStore>,
    audit: Arc<dyn AuditSink>,
    timeout: Duration,
}

impl ScopeUpdater {
    pub fn new(store: Arc<dyn ScopeStore>, audit: Arc<dyn AuditSink>, config: &CheckerConfig) -> Self {
        Self {
            store,
            audit,
            timeout: config.store_timeout(),
        }
    }

    /// Merge `incoming` actions into the scope of `role` for `system_id`
    ///
    /// The system entry is created when the role has none yet. The merged
    /// scope is saved before the audit record is written; nothing is
    /// recorded when the save fails. Returns the merged actions of the
    /// system.
    pub async fn inc_update_auth_scope(
        &self,
        role: &Role,
        system_id: &str,
        incoming: Vec<Policy>,
        actor: &str,
    ) -> Result<Vec<Policy>> {
        if role.is_staff() {
            return Err(Violation::StaffRole.into());
        }

        let mut scope = bounded(
            self.timeout,
            "authorization scope load",
            self.store.load_auth_scope(role.id),
        )
        .await?;

        let position = scope.iter().position(|s| s.system_id == system_id);
        if incoming.is_empty() {
            debug!("Empty increment for role {} on {}", role.id, system_id);
            return Ok(position
                .map(|i| scope[i].actions.clone())
                .unwrap_or_default());
        }

        let before = match position {
            Some(i) => scope[i].actions.clone(),
            None => Vec::new(),
        };
        let merged = merge_incremental_scope(before.clone(), incoming);

        match position {
            Some(i) => scope[i].actions = merged.clone(),
            None => scope.push(AuthScopeSystem::new(system_id, merged.clone())),
        }

        bounded(
            self.timeout,
            "authorization scope save",
            self.store.save_auth_scope(role.id, scope),
        )
        .await?;

        info!(
            "Merged scope of role {} on {}: {} -> {} actions",
            role.id,
            system_id,
            before.len(),
            merged.len()
        );

        let before = serde_json::to_value(&before)?;
        let after = serde_json::to_value(&merged)?;
        let record = AuditRecord::new(
            AuditAction::AuthScopeIncrement,
            actor,
            role.id,
            serde_json::json!({ "system_id": system_id, "actions": before }),
            serde_json::json!({ "system_id": system_id, "actions": after }),
        );
        bounded(self.timeout, "audit record", self.audit.record(record)).await?;

        Ok(merged)
    }
}
