use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::payments;

/// One row of an account's append-only payment history.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
pub struct PaymentEntity {
    pub id: Uuid,
    pub account_id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    pub method: String,
    pub transaction_id: Option<String>,
    pub purpose: String,
    pub status: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub struct NewPaymentEntity {
    pub account_id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    pub method: String,
    pub transaction_id: Option<String>,
    pub purpose: String,
    pub status: String,
    pub metadata: serde_json::Value,
}
