// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Record Storage Module
//!
//! Donation attempts and administrative notes are persisted as JSON arrays in
//! the data directory (`DATA_DIR`, default `./data`).
//!
//! ## Storage Layout
//!
//! ```text
//! data/
//!   donations.json          # DonationRecord array, insertion order
//!   contact_messages.json   # ContactNote array
//! ```
//!
//! ## Important Notes
//!
//! - There is no database: each collection is rewritten whole on append
//! - Appends are serialized inside one process; across processes the last
//!   write wins
//! - Records never get deleted by the donation flow

pub mod json_fs;
pub mod memory;
pub mod paths;
pub mod repository;
pub mod status_cache;

pub use json_fs::{JsonStorage, StorageError, StorageResult};
pub use memory::InMemoryDonationStore;
pub use paths::StoragePaths;
pub use repository::{
    ContactNote, ContactNoteRepository, DonationNotes, DonationRecord, DonationRepository,
    DonationStatus, DonationStore, PaymentMethod, StatusTransitionError,
};
pub use status_cache::StatusCache;
