use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::processed_webhook_events;

/// De-dup record for an externally delivered event. Its existence is the sole
/// "already handled" signal; `event_id` is unique at the storage layer.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = processed_webhook_events)]
pub struct ProcessedWebhookEventEntity {
    pub id: Uuid,
    pub event_id: String,
    pub event_type: String,
    pub processed_at: DateTime<Utc>,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = processed_webhook_events)]
pub struct NewProcessedWebhookEventEntity {
    pub event_id: String,
    pub event_type: String,
    pub metadata: serde_json::Value,
}
