//! Scope storage collaborator

use crate::error::{AuthzError, Result};
use async_trait::async_trait;
use iamscope_core::{AuthScope, RoleId, Subject};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Persistent storage of role scopes
///
/// An unknown role yields an empty scope rather than an error.
#[async_trait]
pub trait ScopeStore: Send + Sync {
    /// Load the authorization scope of a role
    async fn load_auth_scope(&self, role_id: RoleId) -> Result<AuthScope>;

    /// Load the subject scope of a role
    async fn load_subject_scope(&self, role_id: RoleId) -> Result<Vec<Subject>>;

    /// Replace the authorization scope of a role
    async fn save_auth_scope(&self, role_id: RoleId, scope: AuthScope) -> Result<()>;
}

/// Run a collaborator call, mapping an elapsed timeout to `Unavailable`
pub(crate) async fn bounded<T, F>(timeout: Duration, what: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(AuthzError::Unavailable(format!(
            "{} timed out after {}ms",
            what,
            timeout.as_millis()
        ))),
    }
}

/// In-memory scope store
pub struct InMemoryScopeStore {
    auth_scopes: Arc<RwLock<HashMap<RoleId, AuthScope>>>,
    subject_scopes: Arc<RwLock<HashMap<RoleId, Vec<Subject>>>>,
}

impl InMemoryScopeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            auth_scopes: Arc::new(RwLock::new(HashMap::new())),
            subject_scopes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Set the authorization scope of a role
    pub async fn set_auth_scope(&self, role_id: RoleId, scope: AuthScope) {
        self.auth_scopes.write().await.insert(role_id, scope);
    }

    /// Set the subject scope of a role, dropping repeated `(type, id)` pairs
    pub async fn set_subject_scope(&self, role_id: RoleId, subjects: Vec<Subject>) {
        self.subject_scopes
            .write()
            .await
            .insert(role_id, Subject::dedup(subjects));
    }
}

impl Default for InMemoryScopeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScopeStore for InMemoryScopeStore {
    async fn load_auth_scope(&self, role_id: RoleId) -> Result<AuthScope> {
        let scopes = self.auth_scopes.read().await;
        Ok(scopes.get(&role_id).cloned().unwrap_or_default())
    }

    async fn load_subject_scope(&self, role_id: RoleId) -> Result<Vec<Subject>> {
        let scopes = self.subject_scopes.read().await;
        Ok(scopes.get(&role_id).cloned().unwrap_or_default())
    }

    async fn save_auth_scope(&self, role_id: RoleId, scope: AuthScope) -> Result<()> {
        self.auth_scopes.write().await.insert(role_id, scope);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iamscope_core::AuthScopeSystem;

    #[tokio::test]
    async fn test_unknown_role_has_empty_scope() {
        let store = InMemoryScopeStore::new();
        assert!(store.load_auth_scope(1).await.unwrap().is_empty());
        assert!(store.load_subject_scope(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subject_scope_deduplicated() {
        let store = InMemoryScopeStore::new();
        store
            .set_subject_scope(1, vec![Subject::user("a"), Subject::user("a"), Subject::department("1")])
            .await;

        assert_eq!(store.load_subject_scope(1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_save_replaces_scope() {
        let store = InMemoryScopeStore::new();
        store.set_auth_scope(1, vec![AuthScopeSystem::all()]).await;
        store
            .save_auth_scope(1, vec![AuthScopeSystem::new("cmdb", vec![])])
            .await
            .unwrap();

        let scope = store.load_auth_scope(1).await.unwrap();
        assert_eq!(scope.len(), 1);
        assert_eq!(scope[0].system_id, "cmdb");
    }

    #[tokio::test]
    async fn test_bounded_times_out_as_unavailable() {
        let result: Result<()> = bounded(Duration::from_millis(10), "scope store", async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;

        assert!(result.unwrap_err().is_unavailable());
    }
}
