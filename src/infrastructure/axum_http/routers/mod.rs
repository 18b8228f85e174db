use std::sync::Arc;

use tracing::error;

use crate::{config::config_model::DotEnvyConfig, payments::stripe_client::StripeClient};

pub mod boosts;
pub mod checkout;
pub mod plans;
pub mod subscriptions;
pub mod webhook;

/// Builds the gateway client when credentials are present. Routers pass
/// `None` through to the use cases, which fail money paths closed.
pub(crate) fn build_gateway(config: &DotEnvyConfig) -> Option<Arc<StripeClient>> {
    let stripe = config.stripe.clone()?;
    match StripeClient::new(stripe) {
        Ok(client) => Some(Arc::new(client)),
        Err(err) => {
            error!(error = ?err, "Failed to construct Stripe client");
            None
        }
    }
}
