//! Workspace repository trait (port)

use async_trait::async_trait;

use crate::domain::Workspace;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Read from the shard the id is assigned to.
    async fn find_by_id(&self, id: &str) -> Result<Option<Workspace>, DomainError>;

    /// The owning shard is unknown here, so every shard may be probed.
    async fn find_by_subscription_id(&self, subscription_id: &str) -> Result<Option<Workspace>, DomainError>;

    async fn create(&self, workspace: &Workspace) -> Result<Workspace, DomainError>;
    async fn update(&self, workspace: &Workspace) -> Result<Workspace, DomainError>;
}
