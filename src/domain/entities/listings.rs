use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::value_objects::boosts::ListingBoostStatusDto;
use crate::domain::value_objects::enums::listing_statuses::ListingStatus;
use crate::infrastructure::postgres::schema::listings;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = listings)]
pub struct ListingEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub status: String,
    pub is_boosted: bool,
    pub boost_expiry: Option<DateTime<Utc>>,
    pub boost_priority: i32,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingEntity {
    pub fn status(&self) -> ListingStatus {
        ListingStatus::from_str(&self.status).unwrap_or(ListingStatus::Deleted)
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// `is_boosted` is never read on its own; activity is always the joint
    /// condition against the stored expiry and the caller's clock.
    pub fn boost_active(&self, now: DateTime<Utc>) -> bool {
        self.is_boosted
            && self
                .boost_expiry
                .map(|expiry| expiry > now)
                .unwrap_or(false)
    }

    pub fn boost_status(&self, now: DateTime<Utc>) -> ListingBoostStatusDto {
        ListingBoostStatusDto {
            listing_id: self.id,
            active: self.boost_active(now),
            boost_expiry: self.boost_expiry,
            boost_priority: self.boost_priority,
        }
    }
}
