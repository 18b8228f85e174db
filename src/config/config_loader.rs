use anyhow::{Context, Result};
use tracing::warn;

use super::config_model::{AuthSecret, Billing, Database, DotEnvyConfig, Server, Stripe};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .context("SERVER_PORT is invalid")?
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .context("SERVER_BODY_LIMIT is invalid")?
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .context("SERVER_TIMEOUT is invalid")?
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").context("DATABASE_URL is invalid")?,
    };

    let stripe = load_stripe();
    if stripe.is_none() {
        warn!("Stripe is not configured; checkout and webhook endpoints will fail closed");
    }

    let billing = Billing {
        currency: std::env::var("BILLING_CURRENCY").unwrap_or_else(|_| "usd".to_string()),
        boost_rate_per_day: std::env::var("BOOST_RATE_PER_DAY")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("BOOST_RATE_PER_DAY is invalid")?,
    };

    Ok(DotEnvyConfig {
        server,
        database,
        stripe,
        billing,
    })
}

/// The gateway is optional: both secrets must be present for it to count as
/// configured. A half-configured gateway is treated as unconfigured.
fn load_stripe() -> Option<Stripe> {
    let secret_key = std::env::var("STRIPE_SECRET_KEY").ok()?;
    let webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET").ok()?;

    Some(Stripe {
        secret_key,
        webhook_secret,
        success_url: std::env::var("CHECKOUT_SUCCESS_URL")
            .unwrap_or_else(|_| "http://localhost:3000/checkout/success".to_string()),
        cancel_url: std::env::var("CHECKOUT_CANCEL_URL")
            .unwrap_or_else(|_| "http://localhost:3000/checkout/cancel".to_string()),
    })
}

pub fn get_auth_secret() -> Result<AuthSecret> {
    dotenvy::dotenv().ok();

    Ok(AuthSecret {
        jwt_secret: std::env::var("JWT_SECRET").context("JWT_SECRET is invalid")?,
    })
}
