//! Records the activity markers usage aggregation reads back

use std::sync::Arc;

use tracing::{debug, error};

use crate::domain::{ActivityRecord, UploadResult};
use crate::error::DomainError;
use crate::repositories::ActivityRepository;

pub struct ActivityRecorder {
    activities: Arc<dyn ActivityRepository>,
}

impl ActivityRecorder {
    pub fn new(activities: Arc<dyn ActivityRepository>) -> Self {
        Self { activities }
    }

    /// Storage usage depends on this row; a failed write is returned to
    /// the caller rather than dropped.
    pub async fn record_upload(&self, workspace_id: &str, upload: &UploadResult) -> Result<ActivityRecord, DomainError> {
        let record = ActivityRecord::file_upload(workspace_id, upload);
        self.write(record).await
    }

    pub async fn record_ai_generation(&self, workspace_id: &str, feature: &str) -> Result<ActivityRecord, DomainError> {
        self.write(ActivityRecord::ai_generation(workspace_id, feature)).await
    }

    pub async fn record_api_request(&self, workspace_id: &str, endpoint: &str) -> Result<ActivityRecord, DomainError> {
        self.write(ActivityRecord::api_request(workspace_id, endpoint)).await
    }

    async fn write(&self, record: ActivityRecord) -> Result<ActivityRecord, DomainError> {
        match self.activities.record(&record).await {
            Ok(()) => {
                debug!(
                    workspace_id = %record.workspace_id,
                    action = record.action.as_str(),
                    "Activity recorded"
                );
                Ok(record)
            }
            Err(e) => {
                error!(
                    workspace_id = %record.workspace_id,
                    action = record.action.as_str(),
                    "Failed to record activity: {}",
                    e
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActivityAction, ResourceClass, Workspace};
    use crate::services::usage_aggregator::UsageAggregator;
    use crate::testing::InMemoryStore;
    use tenant_shared::constants::BYTES_PER_MB;

    #[tokio::test]
    async fn recorded_uploads_feed_storage_usage() {
        let store = Arc::new(InMemoryStore::new());
        let ws = Workspace::new("Acme".to_string()).unwrap();
        let id = ws.id.clone();
        store.insert_workspace(ws);

        let recorder = ActivityRecorder::new(store.clone());
        let upload = UploadResult {
            url: "https://cdn.example.com/a.pdf".to_string(),
            size: 3 * BYTES_PER_MB,
            category: "document".to_string(),
            filename: "a.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
        };
        let record = recorder.record_upload(&id, &upload).await.unwrap();
        assert_eq!(record.action, ActivityAction::FileUpload);
        assert_eq!(record.metadata["size"], 3 * BYTES_PER_MB);
        recorder.record_upload(&id, &upload).await.unwrap();
        recorder.record_ai_generation(&id, "summary").await.unwrap();

        let aggregator = UsageAggregator::new(store.clone(), store.clone());
        assert_eq!(aggregator.current_count(&id, ResourceClass::Storage).await.unwrap(), 6);
        assert_eq!(aggregator.current_count(&id, ResourceClass::AiRequests).await.unwrap(), 1);
    }
}
