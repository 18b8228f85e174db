/// Event kinds the webhook endpoint routes on. Tagged dispatch instead of
/// string matching scattered through handlers; the match in the webhook use
/// case is exhaustive over this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEventKind {
    CheckoutCompleted,
    SubscriptionUpdated,
    SubscriptionDeleted,
    Unhandled,
}

impl WebhookEventKind {
    pub fn from_event_type(event_type: &str) -> Self {
        match event_type {
            "checkout.session.completed" => WebhookEventKind::CheckoutCompleted,
            "customer.subscription.updated" => WebhookEventKind::SubscriptionUpdated,
            "customer.subscription.deleted" => WebhookEventKind::SubscriptionDeleted,
            _ => WebhookEventKind::Unhandled,
        }
    }
}

/// What a delivery amounted to. Duplicates are successes: the gateway gets a
/// 2xx either way so it stops redelivering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Processed,
    Duplicate,
    Ignored,
}
