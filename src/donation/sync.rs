// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reconcile `gateway_initiated` records with the gateway's transaction status.

use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::providers::{GatewayError, PaymentGateway, Transaction};
use crate::storage::{DonationRecord, DonationStatus, DonationStore, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SyncOutcome {
    pub record: DonationRecord,
    /// Whether the record's status moved.
    pub changed: bool,
    /// Raw gateway status, when the gateway was queried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_status: Option<String>,
}

/// Query the gateway for one record and apply the answer.
///
/// Records in any status other than `gateway_initiated` are returned
/// untouched without a gateway call.
pub async fn sync_record(
    gateway: &dyn PaymentGateway,
    store: &dyn DonationStore,
    id: &str,
) -> Result<SyncOutcome, SyncError> {
    let record = store.get(id)?;
    if record.status != DonationStatus::GatewayInitiated {
        return Ok(SyncOutcome {
            record,
            changed: false,
            gateway_status: None,
        });
    }

    let transaction = gateway.query_status(&record.reference).await?;
    apply_transaction(store, &record.id, &transaction)
}

/// Apply an already fetched gateway transaction to a record.
pub fn apply_transaction(
    store: &dyn DonationStore,
    id: &str,
    transaction: &Transaction,
) -> Result<SyncOutcome, SyncError> {
    let (record, changed) = store.apply_gateway_state(id, transaction.state())?;
    if changed {
        info!(
            donation_id = %record.id,
            reference = %record.reference,
            status = record.status.as_str(),
            "Donation status reconciled with gateway"
        );
    }
    Ok(SyncOutcome {
        record,
        changed,
        gateway_status: transaction.status.clone(),
    })
}
