use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::{listing_boosts::NewListingBoostEntity, listings::ListingEntity},
        repositories::listings::ListingRepository,
        value_objects::enums::listing_statuses::ListingStatus,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{listing_boosts, listings},
    },
};

pub struct ListingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ListingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ListingRepository for ListingPostgres {
    async fn find_by_id(&self, listing_id: Uuid) -> Result<Option<ListingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = listings::table
            .find(listing_id)
            .select(ListingEntity::as_select())
            .first::<ListingEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn activate_boost_if_inactive(
        &self,
        listing_id: Uuid,
        expiry: DateTime<Utc>,
        priority: i32,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Active-boost check sits in the WHERE clause: two concurrent
        // activations cannot both match, so exactly one caller sees a row
        // updated.
        let rows = update(listings::table)
            .filter(listings::id.eq(listing_id))
            .filter(listings::status.eq(ListingStatus::Active.to_string()))
            .filter(
                diesel::dsl::sql::<diesel::sql_types::Bool>(
                    "(is_boosted = false OR boost_expiry IS NULL OR boost_expiry <= ",
                )
                .bind::<diesel::sql_types::Timestamptz, _>(now)
                .sql(")"),
            )
            .set((
                listings::is_boosted.eq(true),
                listings::boost_expiry.eq(Some(expiry)),
                listings::boost_priority.eq(priority),
                listings::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(rows > 0)
    }

    async fn force_activate_boost(
        &self,
        listing_id: Uuid,
        expiry: DateTime<Utc>,
        priority: i32,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(listings::table)
            .filter(listings::id.eq(listing_id))
            .set((
                listings::is_boosted.eq(true),
                listings::boost_expiry.eq(Some(expiry)),
                listings::boost_priority.eq(priority),
                listings::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn remove_boost(&self, listing_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(listings::table)
            .filter(listings::id.eq(listing_id))
            .set((
                listings::is_boosted.eq(false),
                listings::boost_expiry.eq(None::<DateTime<Utc>>),
                listings::boost_priority.eq(0),
                listings::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn record_boost(&self, boost: NewListingBoostEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let boost_id = insert_into(listing_boosts::table)
            .values(&boost)
            .returning(listing_boosts::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(boost_id)
    }

    async fn increment_view_count(&self, listing_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(listings::table)
            .filter(listings::id.eq(listing_id))
            .set(listings::view_count.eq(listings::view_count + 1))
            .execute(&mut conn)?;

        Ok(())
    }
}
