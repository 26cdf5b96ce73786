//! Common types

use uuid::Uuid;

/// Workspaces are addressed by opaque string ids; shard placement hashes
/// the string itself.
pub type WorkspaceId = String;

pub fn new_workspace_id() -> WorkspaceId {
    Uuid::new_v4().to_string()
}
