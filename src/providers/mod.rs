// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Payment gateway integrations.
//!
//! The donation flow only talks to the [`PaymentGateway`] trait; the CamPay
//! client is the production implementation.

pub mod campay;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

pub use campay::{CampayClient, GatewaySession};

/// Failure of a gateway call.
///
/// Every variant takes the degraded branch of the donation flow; the split
/// only matters for logs and admin endpoints.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway configuration missing: {0}")]
    MissingConfig(String),

    #[error("gateway authentication failed: {0}")]
    Auth(String),

    #[error("gateway returned HTTP {status}: {body}")]
    Http { status: u16, body: Value },

    #[error("gateway unreachable: {0}")]
    Transport(String),

    #[error("gateway response was invalid: {0}")]
    InvalidResponse(String),

    #[error("invalid transaction reference `{0}`")]
    InvalidReference(String),
}

/// Coarse lifecycle of a gateway transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    Pending,
    Successful,
    Failed,
}

pub fn map_transaction_status(raw_status: &str) -> TransactionState {
    let status = raw_status.trim().to_ascii_uppercase();
    match status.as_str() {
        "SUCCESSFUL" | "SUCCESS" => TransactionState::Successful,
        "FAILED" | "CANCELLED" | "EXPIRED" => TransactionState::Failed,
        _ => TransactionState::Pending,
    }
}

/// Transaction object returned by collect, withdraw, status and history calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub reference: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Transaction {
    /// Missing status is treated as still pending.
    pub fn state(&self) -> TransactionState {
        self.status
            .as_deref()
            .map(map_transaction_status)
            .unwrap_or(TransactionState::Pending)
    }
}

/// Hosted payment page created for a donation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLink {
    pub payment_link: String,
    /// Gateway-assigned reference, when the gateway sends one.
    pub reference: Option<String>,
}

/// Merchant account balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Balance {
    #[serde(default, alias = "total_balance", deserialize_with = "lenient_amount")]
    pub balance: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

pub struct PaymentLinkRequest<'a> {
    pub amount: &'a str,
    pub currency: &'a str,
    pub description: &'a str,
    pub external_reference: &'a str,
    pub redirect_url: &'a str,
}

pub struct CollectRequest<'a> {
    pub amount: &'a str,
    /// Normalized subscriber number (`2376XXXXXXXX`).
    pub phone: &'a str,
    pub description: &'a str,
    pub external_reference: &'a str,
}

/// Operations the donation flow and the reconciliation job need.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_link(
        &self,
        request: PaymentLinkRequest<'_>,
    ) -> Result<PaymentLink, GatewayError>;

    async fn collect_direct(&self, request: CollectRequest<'_>)
        -> Result<Transaction, GatewayError>;

    async fn query_status(&self, reference: &str) -> Result<Transaction, GatewayError>;
}

/// Amounts come back as JSON numbers or strings depending on the endpoint.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transaction_status_mapping_is_stable() {
        assert_eq!(
            map_transaction_status("SUCCESSFUL"),
            TransactionState::Successful
        );
        assert_eq!(map_transaction_status("failed"), TransactionState::Failed);
        assert_eq!(map_transaction_status("Expired"), TransactionState::Failed);
        assert_eq!(map_transaction_status("PENDING"), TransactionState::Pending);
        assert_eq!(map_transaction_status(""), TransactionState::Pending);
    }

    #[test]
    fn transaction_accepts_numeric_and_string_amounts() {
        let numeric: Transaction =
            serde_json::from_value(json!({ "reference": "T1", "amount": 5000 })).unwrap();
        assert_eq!(numeric.amount.as_deref(), Some("5000"));

        let text: Transaction =
            serde_json::from_value(json!({ "reference": "T2", "amount": "250" })).unwrap();
        assert_eq!(text.amount.as_deref(), Some("250"));
    }

    #[test]
    fn transaction_without_status_is_pending() {
        let tx: Transaction = serde_json::from_value(json!({ "reference": "T3" })).unwrap();
        assert_eq!(tx.state(), TransactionState::Pending);
        assert!(tx.amount.is_none());
    }

    #[test]
    fn balance_reads_total_balance_alias() {
        let balance: Balance =
            serde_json::from_value(json!({ "total_balance": 12000, "currency": "XAF" })).unwrap();
        assert_eq!(balance.balance.as_deref(), Some("12000"));
    }
}
