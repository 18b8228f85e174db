use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use diesel::{RunQueryDsl, delete, insert_into, prelude::*};
use std::sync::Arc;

use crate::{
    domain::{
        entities::webhook_events::{NewProcessedWebhookEventEntity, ProcessedWebhookEventEntity},
        repositories::webhook_events::WebhookEventRepository,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad, schema::processed_webhook_events,
    },
};

pub struct WebhookEventPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl WebhookEventPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl WebhookEventRepository for WebhookEventPostgres {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<ProcessedWebhookEventEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = processed_webhook_events::table
            .filter(processed_webhook_events::event_id.eq(event_id))
            .select(ProcessedWebhookEventEntity::as_select())
            .first::<ProcessedWebhookEventEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn record(&self, event: NewProcessedWebhookEventEntity) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // event_id is unique; a concurrent delivery of the same event makes
        // this insert a no-op rather than an error.
        let rows = insert_into(processed_webhook_events::table)
            .values(&event)
            .on_conflict(processed_webhook_events::event_id)
            .do_nothing()
            .execute(&mut conn)?;

        Ok(rows > 0)
    }

    async fn purge_older_than_days(&self, days: i64) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let cutoff = Utc::now() - Duration::days(days);
        let purged = delete(processed_webhook_events::table)
            .filter(processed_webhook_events::processed_at.lt(cutoff))
            .execute(&mut conn)?;

        Ok(purged)
    }
}
