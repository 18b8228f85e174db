use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    Stripe,
    Credits,
    Admin,
}

impl PaymentMethod {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "stripe" => Some(PaymentMethod::Stripe),
            "credits" => Some(PaymentMethod::Credits),
            "admin" => Some(PaymentMethod::Admin),
            _ => None,
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let method = match self {
            PaymentMethod::Stripe => "stripe",
            PaymentMethod::Credits => "credits",
            PaymentMethod::Admin => "admin",
        };
        write!(f, "{}", method)
    }
}
