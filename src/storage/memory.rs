// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory record store.
//!
//! Used when no data directory is wanted (tests, dry runs). Same contract as
//! the file-backed repository: insertion order, terminal records immutable.

use std::sync::Mutex;

use super::repository::{DonationRecord, DonationStore};
use super::{StorageError, StorageResult};

#[derive(Default)]
pub struct InMemoryDonationStore {
    records: Mutex<Vec<DonationRecord>>,
}

impl InMemoryDonationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DonationStore for InMemoryDonationStore {
    fn append(&self, record: &DonationRecord) -> StorageResult<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        records.push(record.clone());
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<DonationRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(records.clone())
    }

    fn update(
        &self,
        id: &str,
        apply: &mut dyn FnMut(&mut DonationRecord) -> StorageResult<()>,
    ) -> StorageResult<DonationRecord> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        let Some(slot) = records.iter_mut().find(|record| record.id == id) else {
            return Err(StorageError::NotFound(format!("Donation {id}")));
        };
        // Work on a copy so a rejected transition leaves the stored record untouched.
        let mut candidate = slot.clone();
        apply(&mut candidate)?;
        *slot = candidate.clone();
        Ok(candidate)
    }
}
