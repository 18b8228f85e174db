pub mod boosts;
pub mod checkout;
pub mod enums;
pub mod iam;
pub mod subscriptions;
pub mod webhooks;
