use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::payments::stripe_client::{StripeCheckoutSession, StripeClient, StripeEvent};

#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct CreatedCheckoutSession {
    pub session_id: String,
    pub redirect_url: String,
}

/// Seam between the use cases and the payment gateway, mockable in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CreatedCheckoutSession>;

    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<StripeCheckoutSession>;

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> Result<StripeEvent>;
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CreatedCheckoutSession> {
        self.create_checkout_session(request).await
    }

    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<StripeCheckoutSession> {
        self.retrieve_checkout_session(session_id).await
    }

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> Result<StripeEvent> {
        self.verify_webhook_signature(payload, signature)
    }
}
