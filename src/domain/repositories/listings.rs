use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::listing_boosts::NewListingBoostEntity;
use crate::domain::entities::listings::ListingEntity;

#[async_trait]
#[automock]
pub trait ListingRepository {
    async fn find_by_id(&self, listing_id: Uuid) -> Result<Option<ListingEntity>>;

    /// Conditional activation: flips the boost columns only while the listing
    /// is non-terminal and not already actively boosted as of `now`. Returns
    /// whether a row was updated, so near-simultaneous credit- and
    /// gateway-funded boosts cannot both win.
    async fn activate_boost_if_inactive(
        &self,
        listing_id: Uuid,
        expiry: DateTime<Utc>,
        priority: i32,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// Administrator grant: overwrites the boost columns unconditionally.
    async fn force_activate_boost(
        &self,
        listing_id: Uuid,
        expiry: DateTime<Utc>,
        priority: i32,
    ) -> Result<()>;

    async fn remove_boost(&self, listing_id: Uuid) -> Result<()>;

    /// Appends to the listing's boost history.
    async fn record_boost(&self, boost: NewListingBoostEntity) -> Result<Uuid>;

    /// Best-effort view tracking; callers fire this off the request path.
    async fn increment_view_count(&self, listing_id: Uuid) -> Result<()>;
}
