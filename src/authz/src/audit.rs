//! Audit records for scope mutations
//!
//! The engine records only after a mutation has been persisted. Checks never
//! produce audit records.

use crate::error::Result;
use async_trait::async_trait;
use iamscope_core::RoleId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Kind of audited mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Actions were merged into a role's authorization scope
    AuthScopeIncrement,
}

/// One audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique record ID
    pub id: String,

    pub action: AuditAction,

    /// Who performed the mutation
    pub actor: String,

    /// Role whose scope changed
    pub role_id: RoleId,

    /// State before the mutation
    pub before: serde_json::Value,

    /// State after the mutation
    pub after: serde_json::Value,

    /// Timestamp (milliseconds since epoch)
    pub timestamp: i64,
}

impl AuditRecord {
    /// Create a record stamped with a fresh id and the current time
    pub fn new(
        action: AuditAction,
        actor: impl Into<String>,
        role_id: RoleId,
        before: serde_json::Value,
        after: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action,
            actor: actor.into(),
            role_id,
            before,
            after,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Destination of audit records
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: AuditRecord) -> Result<()>;
}

/// Audit sink keeping records in memory
#[derive(Default)]
pub struct InMemoryAuditSink {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records received so far, oldest first
    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<()> {
        self.records.write().await.push(record);
        Ok(())
    }
}
