use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ListingStatus {
    #[default]
    Active,
    Sold,
    Deleted,
}

impl ListingStatus {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "active" => Some(ListingStatus::Active),
            "sold" => Some(ListingStatus::Sold),
            "deleted" => Some(ListingStatus::Deleted),
            _ => None,
        }
    }

    /// Sold and deleted listings can never be boosted again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ListingStatus::Sold | ListingStatus::Deleted)
    }
}

impl Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ListingStatus::Active => "active",
            ListingStatus::Sold => "sold",
            ListingStatus::Deleted => "deleted",
        };
        write!(f, "{}", status)
    }
}
