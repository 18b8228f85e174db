use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::plans::PlanEntity;

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionDto {
    pub plan: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub is_active: bool,
    pub auto_renew: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanDto {
    pub name: String,
    pub display_name: String,
    pub price_minor: i64,
    pub duration_days: i32,
    pub features: serde_json::Value,
    pub max_listings: i32,
    pub boost_credits: i32,
}

impl From<PlanEntity> for PlanDto {
    fn from(value: PlanEntity) -> Self {
        Self {
            name: value.name,
            display_name: value.display_name,
            price_minor: value.price_minor,
            duration_days: value.duration_days,
            features: value.features,
            max_listings: value.max_listings,
            boost_credits: value.boost_credits,
        }
    }
}
