use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::listing_boosts;

/// One row of a listing's append-only boost history.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = listing_boosts)]
pub struct ListingBoostEntity {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub boosted_by: Uuid,
    pub boost_type: String,
    pub duration_days: i32,
    pub boosted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = listing_boosts)]
pub struct NewListingBoostEntity {
    pub listing_id: Uuid,
    pub boosted_by: Uuid,
    pub boost_type: String,
    pub duration_days: i32,
    pub expires_at: DateTime<Utc>,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
}
