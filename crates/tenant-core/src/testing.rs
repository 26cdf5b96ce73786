//! In-memory adapters for every repository port.
//!
//! Shared by this crate's unit tests and, behind the `testing` feature, by
//! the HTTP layer's router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ActivityAction, ActivityRecord, BillingLogEntry, ResourceClass, Workspace};
use crate::error::DomainError;
use crate::repositories::{ActivityRepository, BillingLogRepository, UsageRepository, WorkspaceRepository};

#[derive(Default)]
pub struct InMemoryStore {
    workspaces: Mutex<HashMap<String, Workspace>>,
    logs: Mutex<Vec<BillingLogEntry>>,
    counts: Mutex<HashMap<(String, ResourceClass), u64>>,
    activities: Mutex<Vec<ActivityRecord>>,
    fail_log_appends: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_workspace(&self, workspace: Workspace) {
        self.lock_workspaces().insert(workspace.id.clone(), workspace);
    }

    pub fn workspace(&self, id: &str) -> Option<Workspace> {
        self.lock_workspaces().get(id).cloned()
    }

    pub fn set_count(&self, workspace_id: &str, resource: ResourceClass, count: u64) {
        self.counts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((workspace_id.to_string(), resource), count);
    }

    pub fn logs(&self) -> Vec<BillingLogEntry> {
        self.logs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn activities(&self) -> Vec<ActivityRecord> {
        self.activities.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Make every subsequent billing log append fail.
    pub fn fail_log_appends(&self, fail: bool) {
        self.fail_log_appends.store(fail, Ordering::SeqCst);
    }

    fn lock_workspaces(&self) -> std::sync::MutexGuard<'_, HashMap<String, Workspace>> {
        self.workspaces.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl WorkspaceRepository for InMemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Workspace>, DomainError> {
        Ok(self.workspace(id))
    }

    async fn find_by_subscription_id(&self, subscription_id: &str) -> Result<Option<Workspace>, DomainError> {
        Ok(self
            .lock_workspaces()
            .values()
            .find(|ws| ws.subscription_id.as_deref() == Some(subscription_id))
            .cloned())
    }

    async fn create(&self, workspace: &Workspace) -> Result<Workspace, DomainError> {
        self.insert_workspace(workspace.clone());
        Ok(workspace.clone())
    }

    async fn update(&self, workspace: &Workspace) -> Result<Workspace, DomainError> {
        let mut workspaces = self.lock_workspaces();
        if !workspaces.contains_key(&workspace.id) {
            return Err(DomainError::TenantNotFound(workspace.id.clone()));
        }
        workspaces.insert(workspace.id.clone(), workspace.clone());
        Ok(workspace.clone())
    }
}

#[async_trait]
impl BillingLogRepository for InMemoryStore {
    async fn append(&self, entry: &BillingLogEntry) -> Result<(), DomainError> {
        if self.fail_log_appends.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("billing_logs unavailable".to_string()));
        }
        self.logs.lock().unwrap_or_else(|e| e.into_inner()).push(entry.clone());
        Ok(())
    }

    async fn list_for_workspace(&self, workspace_id: &str) -> Result<Vec<BillingLogEntry>, DomainError> {
        Ok(self
            .logs()
            .into_iter()
            .filter(|entry| entry.workspace_id == workspace_id)
            .collect())
    }
}

#[async_trait]
impl UsageRepository for InMemoryStore {
    async fn count_resource(&self, workspace_id: &str, resource: ResourceClass) -> Result<u64, DomainError> {
        Ok(self
            .counts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(workspace_id.to_string(), resource))
            .copied()
            .unwrap_or(0))
    }

    async fn sum_activity_bytes(&self, workspace_id: &str, action: ActivityAction) -> Result<u64, DomainError> {
        Ok(self
            .activities()
            .iter()
            .filter(|a| a.workspace_id == workspace_id && a.action == action)
            .filter_map(|a| a.metadata.get("size").and_then(|v| v.as_u64()))
            .sum())
    }

    async fn count_activity_since(
        &self,
        workspace_id: &str,
        action: ActivityAction,
        since: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        Ok(self
            .activities()
            .iter()
            .filter(|a| a.workspace_id == workspace_id && a.action == action && a.created_at >= since)
            .count() as u64)
    }
}

#[async_trait]
impl ActivityRepository for InMemoryStore {
    async fn record(&self, record: &ActivityRecord) -> Result<(), DomainError> {
        self.activities
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());
        Ok(())
    }
}
