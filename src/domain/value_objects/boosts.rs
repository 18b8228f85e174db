use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Priority assigned to boosts settled through the gateway or funded by
/// credits. Admin grants may go higher.
pub const GATEWAY_BOOST_PRIORITY: i32 = 50;
pub const ADMIN_BOOST_PRIORITY: i32 = 100;

/// One credit settles as one major currency unit at the gateway.
pub const CREDIT_MINOR_VALUE: i64 = 100;

pub const MIN_BOOST_DAYS: i64 = 1;
pub const MAX_BOOST_DAYS: i64 = 365;

/// Result of a credit-funded boost attempt. Insufficient balance is a soft
/// signal bridging to gateway checkout, not a failure.
#[derive(Debug, PartialEq)]
pub enum CreditBoostOutcome {
    Activated {
        expiry: DateTime<Utc>,
        priority: i32,
        remaining_credits: i32,
    },
    PaymentRequired {
        cost: i64,
        balance: i64,
        shortfall: i64,
    },
}

#[derive(Debug, PartialEq)]
pub enum AdminChargeOutcome {
    NotCharged,
    Charged { remaining_credits: i32 },
    /// Owner balance was insufficient; a pending payment entry was recorded
    /// for manual follow-up instead of blocking the promotion.
    PendingPayment { amount_minor: i64 },
}

#[derive(Debug, PartialEq)]
pub struct AdminBoostResult {
    pub expiry: DateTime<Utc>,
    pub priority: i32,
    pub charge: AdminChargeOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingBoostStatusDto {
    pub listing_id: Uuid,
    pub active: bool,
    pub boost_expiry: Option<DateTime<Utc>>,
    pub boost_priority: i32,
}
