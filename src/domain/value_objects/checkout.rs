use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use super::boosts::ListingBoostStatusDto;
use super::enums::payment_purposes::PaymentPurpose;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CheckoutSessionDto {
    pub session_id: String,
    pub redirect_url: String,
}

/// Outcome of checkout initiation. Free tiers bypass the gateway entirely.
#[derive(Debug, PartialEq)]
pub enum CheckoutOutcome {
    Session(CheckoutSessionDto),
    Activated,
}

/// Metadata bag carried on a gateway session, echoed back on the webhook.
/// This is the only state that survives the initiation/settlement gap, so the
/// reconciler re-verifies everything else against fresh storage reads.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutMetadata {
    pub account_id: Uuid,
    pub purpose: PaymentPurpose,
    pub listing_id: Option<Uuid>,
    pub duration_days: Option<i64>,
    pub plan_name: Option<String>,
    pub auto_renew: Option<bool>,
}

impl CheckoutMetadata {
    pub fn to_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::from([
            ("account_id".to_string(), self.account_id.to_string()),
            ("purpose".to_string(), self.purpose.to_string()),
        ]);
        if let Some(listing_id) = self.listing_id {
            map.insert("listing_id".to_string(), listing_id.to_string());
        }
        if let Some(duration_days) = self.duration_days {
            map.insert("duration_days".to_string(), duration_days.to_string());
        }
        if let Some(plan_name) = &self.plan_name {
            map.insert("plan_name".to_string(), plan_name.clone());
        }
        if let Some(auto_renew) = self.auto_renew {
            map.insert("auto_renew".to_string(), auto_renew.to_string());
        }
        map
    }

    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, String> {
        let account_id = map
            .get("account_id")
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or_else(|| "missing or invalid account_id".to_string())?;
        let purpose = map
            .get("purpose")
            .and_then(|v| PaymentPurpose::from_str(v))
            .ok_or_else(|| "missing or invalid purpose".to_string())?;

        Ok(Self {
            account_id,
            purpose,
            listing_id: map.get("listing_id").and_then(|v| Uuid::parse_str(v).ok()),
            duration_days: map.get("duration_days").and_then(|v| v.parse().ok()),
            plan_name: map.get("plan_name").cloned(),
            auto_renew: map.get("auto_renew").and_then(|v| v.parse().ok()),
        })
    }
}

/// Live view of a gateway session used by the client after redirect-back,
/// since webhook delivery may lag the user's return.
#[derive(Debug, Serialize)]
pub struct SessionStatusDto {
    pub session_id: String,
    pub payment_status: String,
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost: Option<ListingBoostStatusDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_round_trips_through_the_gateway_bag() {
        let metadata = CheckoutMetadata {
            account_id: Uuid::new_v4(),
            purpose: PaymentPurpose::Boost,
            listing_id: Some(Uuid::new_v4()),
            duration_days: Some(7),
            plan_name: None,
            auto_renew: None,
        };

        let parsed = CheckoutMetadata::from_map(&metadata.to_map()).unwrap();
        assert_eq!(parsed, metadata);
    }

    #[test]
    fn rejects_bag_without_purpose() {
        let map = HashMap::from([("account_id".to_string(), Uuid::new_v4().to_string())]);
        assert!(CheckoutMetadata::from_map(&map).is_err());
    }
}
