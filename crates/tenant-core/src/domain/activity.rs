use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Activity markers the usage aggregator reads back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    FileUpload,
    AiGeneration,
    ApiRequest,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileUpload => "file_upload",
            Self::AiGeneration => "ai_generation",
            Self::ApiRequest => "api_request",
        }
    }
}

/// Result returned by the object storage provider after an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub url: String,
    pub size: u64,
    pub category: String,
    pub filename: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub workspace_id: String,
    pub action: ActivityAction,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl ActivityRecord {
    pub fn new(workspace_id: impl Into<String>, action: ActivityAction, metadata: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id: workspace_id.into(),
            action,
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Upload marker carrying the byte `size` that storage usage sums.
    pub fn file_upload(workspace_id: impl Into<String>, upload: &UploadResult) -> Self {
        Self::new(
            workspace_id,
            ActivityAction::FileUpload,
            json!({
                "size": upload.size,
                "url": upload.url,
                "category": upload.category,
                "filename": upload.filename,
                "mime_type": upload.mime_type,
            }),
        )
    }

    pub fn ai_generation(workspace_id: impl Into<String>, feature: &str) -> Self {
        Self::new(workspace_id, ActivityAction::AiGeneration, json!({ "feature": feature }))
    }

    pub fn api_request(workspace_id: impl Into<String>, endpoint: &str) -> Self {
        Self::new(workspace_id, ActivityAction::ApiRequest, json!({ "endpoint": endpoint }))
    }
}
