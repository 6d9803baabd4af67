// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Donation record repository.
//!
//! All records live in one JSON array (`donations.json`). `append` is a
//! read-modify-write of the whole array: serialized within this process by a
//! mutex, last-write-wins across processes.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::donation::{Amount, DonationIntent, DonationType};
use crate::providers::TransactionState;
use crate::storage::{JsonStorage, StorageError, StorageResult};

/// How the donor pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Online collection through the mobile-money gateway.
    MobileGateway,
    /// Offline transfer using the manual instructions.
    BankTransfer,
}

/// Donation record lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    /// Built in memory, gateway not contacted yet.
    Pending,
    /// Gateway accepted the payment request.
    GatewayInitiated,
    /// Gateway unavailable; donor received manual instructions.
    PendingManual,
    /// Funds received.
    Completed,
    /// Payment will not happen.
    Failed,
}

impl DonationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DonationStatus::Completed | DonationStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::GatewayInitiated => "gateway_initiated",
            DonationStatus::PendingManual => "pending_manual",
            DonationStatus::Completed => "completed",
            DonationStatus::Failed => "failed",
        }
    }
}

/// Attempt to change a record that already reached a terminal status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("donation {id} is {from:?} and cannot move to {to:?}")]
pub struct StatusTransitionError {
    pub id: String,
    pub from: DonationStatus,
    pub to: DonationStatus,
}

/// Persisted donation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationRecord {
    /// Unique identifier, assigned before any network call.
    pub id: String,
    pub donor_name: String,
    pub email: String,
    /// Normalized subscriber number.
    pub phone: String,
    #[schema(value_type = f64)]
    pub amount: Amount,
    pub currency: String,
    pub donation_type: DonationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub payment_method: PaymentMethod,
    pub status: DonationStatus,
    /// Gateway reference, or the locally generated external reference.
    pub reference: String,
    /// Reference we generated and sent to the gateway.
    pub external_reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_link: Option<String>,
    pub date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DonationRecord {
    /// Fresh `pending` record with a newly generated id and external reference.
    pub fn new_pending(intent: &DonationIntent, payment_method: PaymentMethod) -> Self {
        let now = Utc::now();
        let external_reference = generate_external_reference();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            donor_name: intent.donor_name.clone(),
            email: intent.donor_email.clone(),
            phone: intent.donor_phone.to_string(),
            amount: intent.amount,
            currency: intent.currency.clone(),
            donation_type: intent.donation_type,
            project: intent.project.clone(),
            payment_method,
            status: DonationStatus::Pending,
            reference: external_reference.clone(),
            external_reference,
            payment_link: None,
            date: now,
            updated_at: now,
            notes: intent.message.clone(),
        }
    }

    /// Move to `to`, refusing to leave `completed` or `failed`.
    pub fn transition(&mut self, to: DonationStatus) -> Result<(), StatusTransitionError> {
        if self.status.is_terminal() && self.status != to {
            return Err(StatusTransitionError {
                id: self.id.clone(),
                from: self.status,
                to,
            });
        }
        if self.status.is_terminal() {
            // Re-asserting a terminal status is a no-op.
            return Ok(());
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Gateway accepted the request. An empty or missing gateway reference
    /// keeps the external reference.
    pub fn mark_gateway_initiated(
        &mut self,
        gateway_reference: Option<String>,
        payment_link: Option<String>,
    ) -> Result<(), StatusTransitionError> {
        self.transition(DonationStatus::GatewayInitiated)?;
        if let Some(reference) = gateway_reference.filter(|r| !r.trim().is_empty()) {
            self.reference = reference;
        }
        self.payment_link = payment_link;
        Ok(())
    }

    /// Gateway unavailable; keep the intent for manual follow-up.
    pub fn mark_pending_manual(&mut self, note: &str) -> Result<(), StatusTransitionError> {
        self.transition(DonationStatus::PendingManual)?;
        self.append_note(note);
        Ok(())
    }

    /// Reconcile with the gateway's view of the transaction. Returns whether
    /// the status changed.
    pub fn apply_gateway_state(
        &mut self,
        state: TransactionState,
    ) -> Result<bool, StatusTransitionError> {
        let target = match state {
            TransactionState::Successful => DonationStatus::Completed,
            TransactionState::Failed => DonationStatus::Failed,
            TransactionState::Pending => return Ok(false),
        };
        if self.status == target {
            return Ok(false);
        }
        self.transition(target)?;
        Ok(true)
    }

    /// No-op on `completed` and `failed` records.
    pub fn append_note(&mut self, note: &str) {
        let note = note.trim();
        if note.is_empty() || self.status.is_terminal() {
            return;
        }
        self.notes = Some(match self.notes.take() {
            Some(existing) => format!("{existing} | {note}"),
            None => note.to_string(),
        });
        self.updated_at = Utc::now();
    }
}

/// `DON-` followed by 12 uppercase hex characters.
pub fn generate_external_reference() -> String {
    let simple = uuid::Uuid::new_v4().simple().to_string();
    format!("DON-{}", simple[..12].to_ascii_uppercase())
}

/// Append-only record store contract used by the donation flow.
pub trait DonationStore: Send + Sync {
    fn append(&self, record: &DonationRecord) -> StorageResult<()>;

    /// All records in insertion order. Reading never alters the store.
    fn list(&self) -> StorageResult<Vec<DonationRecord>>;

    /// Read-modify-write of a single record.
    fn update(
        &self,
        id: &str,
        apply: &mut dyn FnMut(&mut DonationRecord) -> StorageResult<()>,
    ) -> StorageResult<DonationRecord>;

    fn get(&self, id: &str) -> StorageResult<DonationRecord> {
        self.list()?
            .into_iter()
            .find(|record| record.id == id)
            .ok_or_else(|| StorageError::NotFound(format!("Donation {id}")))
    }

    fn list_by_status(&self, status: DonationStatus) -> StorageResult<Vec<DonationRecord>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|record| record.status == status)
            .collect())
    }

    /// Administrative status change, with an optional note appended.
    fn update_status(
        &self,
        id: &str,
        status: DonationStatus,
        note: Option<&str>,
    ) -> StorageResult<DonationRecord> {
        let note = note.map(str::trim).filter(|n| !n.is_empty());
        self.update(id, &mut |record| {
            if record.status.is_terminal() && (record.status != status || note.is_some()) {
                return Err(StatusTransitionError {
                    id: record.id.clone(),
                    from: record.status,
                    to: status,
                }
                .into());
            }
            if let Some(note) = note {
                record.append_note(note);
            }
            record.transition(status)?;
            Ok(())
        })
    }

    /// Apply the gateway's view of a transaction. Returns the record and
    /// whether its status changed.
    fn apply_gateway_state(
        &self,
        id: &str,
        state: TransactionState,
    ) -> StorageResult<(DonationRecord, bool)> {
        let mut changed = false;
        let record = self.update(id, &mut |record| {
            changed = record.apply_gateway_state(state)?;
            Ok(())
        })?;
        Ok((record, changed))
    }
}

/// File-backed donation store.
pub struct DonationRepository {
    storage: JsonStorage,
    write_lock: Mutex<()>,
}

impl DonationRepository {
    pub fn new(storage: JsonStorage) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> StorageResult<Vec<DonationRecord>> {
        self.storage
            .read_json_or_default(self.storage.paths().donations_file())
    }

    fn write_all(&self, records: &[DonationRecord]) -> StorageResult<()> {
        self.storage
            .write_json(self.storage.paths().donations_file(), &records)
    }
}

impl DonationStore for DonationRepository {
    fn append(&self, record: &DonationRecord) -> StorageResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        let mut records = self.read_all()?;
        records.push(record.clone());
        self.write_all(&records)
    }

    fn list(&self) -> StorageResult<Vec<DonationRecord>> {
        self.read_all()
    }

    fn update(
        &self,
        id: &str,
        apply: &mut dyn FnMut(&mut DonationRecord) -> StorageResult<()>,
    ) -> StorageResult<DonationRecord> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        let mut records = self.read_all()?;
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| StorageError::NotFound(format!("Donation {id}")))?;
        apply(record)?;
        let updated = record.clone();
        self.write_all(&records)?;
        Ok(updated)
    }
}
