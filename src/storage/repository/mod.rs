// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the JSON record files.

pub mod contact;
pub mod donations;

pub use contact::{ContactNote, ContactNoteRepository, DonationNotes};
pub use donations::{
    generate_external_reference, DonationRecord, DonationRepository, DonationStatus,
    DonationStore, PaymentMethod, StatusTransitionError,
};
