use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentPurpose {
    Boost,
    Subscription,
}

impl PaymentPurpose {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "boost" => Some(PaymentPurpose::Boost),
            "subscription" => Some(PaymentPurpose::Subscription),
            _ => None,
        }
    }
}

impl Display for PaymentPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let purpose = match self {
            PaymentPurpose::Boost => "boost",
            PaymentPurpose::Subscription => "subscription",
        };
        write!(f, "{}", purpose)
    }
}
