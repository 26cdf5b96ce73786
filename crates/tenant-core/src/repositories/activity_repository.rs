//! Activity repository trait (port)

use async_trait::async_trait;

use crate::domain::ActivityRecord;
use crate::error::DomainError;

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn record(&self, record: &ActivityRecord) -> Result<(), DomainError>;
}
