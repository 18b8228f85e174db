pub mod accounts;
pub mod listing_boosts;
pub mod listings;
pub mod payments;
pub mod plans;
pub mod webhook_events;
