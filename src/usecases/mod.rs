pub mod boosts;
pub mod checkout;
pub mod plan_catalog;
pub mod reconciler;
pub mod subscriptions;
pub mod webhook;
