// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Donation intake: form validation, the submission state machine, manual
//! payment instructions and gateway reconciliation.

pub mod flow;
pub mod instructions;
pub mod intent;
pub mod sync;

pub use flow::{
    CollectionMode, DonationFlow, DonationService, FlowSettings, ManualOutcome, Phase,
    SubmissionState, SuccessOutcome, MANUAL_FALLBACK_MESSAGE,
};
pub use instructions::ManualInstructions;
pub use intent::{
    Amount, DonationForm, DonationIntent, DonationType, ValidationError, MIN_DONATION_AMOUNT,
};
pub use sync::{apply_transaction, sync_record, SyncError, SyncOutcome};
