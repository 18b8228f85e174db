use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::webhook_events::{
    NewProcessedWebhookEventEntity, ProcessedWebhookEventEntity,
};

#[async_trait]
#[automock]
pub trait WebhookEventRepository {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<ProcessedWebhookEventEntity>>;

    /// Records the event as processed. Returns `false` when another delivery
    /// already recorded it (unique constraint hit), which callers treat as
    /// benign rather than as an error.
    async fn record(&self, event: NewProcessedWebhookEventEntity) -> Result<bool>;

    /// Expunges records older than the retention window. The gateway never
    /// redelivers events that old.
    async fn purge_older_than_days(&self, days: i64) -> Result<usize>;
}
