use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// How a boost was funded. Recorded in the listing's boost history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BoostType {
    Paid,
    Credits,
    Admin,
}

impl BoostType {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "paid" => Some(BoostType::Paid),
            "credits" => Some(BoostType::Credits),
            "admin" => Some(BoostType::Admin),
            _ => None,
        }
    }
}

impl Display for BoostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let boost_type = match self {
            BoostType::Paid => "paid",
            BoostType::Credits => "credits",
            BoostType::Admin => "admin",
        };
        write!(f, "{}", boost_type)
    }
}
