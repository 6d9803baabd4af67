// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Administrative contact notes.
//!
//! Each accepted donation leaves a short note in `contact_messages.json` so the
//! church office sees it alongside ordinary contact-form messages.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::donations::DonationRecord;
use crate::storage::{JsonStorage, StorageError, StorageResult};

/// Subject line used for donation notes.
pub const DONATION_NOTE_SUBJECT: &str = "New donation";

/// Side channel for administrative visibility of accepted donations.
pub trait DonationNotes: Send + Sync {
    fn record_donation_note(&self, record: &DonationRecord) -> StorageResult<()>;
}

/// One entry of the contact message array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactNote {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    /// Donation this note refers to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donation_id: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl ContactNote {
    pub fn for_donation(record: &DonationRecord) -> Self {
        let mut message = format!(
            "{} donation of {} {} ({}), reference {}.",
            record.donation_type, record.amount, record.currency, record.phone, record.reference
        );
        if let Some(project) = &record.project {
            message.push_str(&format!(" Project: {project}."));
        }
        if let Some(link) = &record.payment_link {
            message.push_str(&format!(" Payment link: {link}"));
        }
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: record.donor_name.clone(),
            email: record.email.clone(),
            subject: DONATION_NOTE_SUBJECT.to_string(),
            message,
            donation_id: Some(record.id.clone()),
            date: Utc::now(),
            read: false,
        }
    }
}

/// File-backed contact note store.
pub struct ContactNoteRepository {
    storage: JsonStorage,
    write_lock: Mutex<()>,
}

impl ContactNoteRepository {
    pub fn new(storage: JsonStorage) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    pub fn list(&self) -> StorageResult<Vec<ContactNote>> {
        self.storage
            .read_json_or_default(self.storage.paths().contact_messages_file())
    }

    pub fn append(&self, note: &ContactNote) -> StorageResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        let mut notes = self.list()?;
        notes.push(note.clone());
        self.storage
            .write_json(self.storage.paths().contact_messages_file(), &notes)
    }
}

impl DonationNotes for ContactNoteRepository {
    fn record_donation_note(&self, record: &DonationRecord) -> StorageResult<()> {
        self.append(&ContactNote::for_donation(record))
    }
}
