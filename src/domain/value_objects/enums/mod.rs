pub mod account_roles;
pub mod boost_types;
pub mod listing_statuses;
pub mod payment_methods;
pub mod payment_purposes;
pub mod payment_statuses;
