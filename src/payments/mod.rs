pub mod gateway;
pub mod stripe_client;
