// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST façade. Domain types
//! ([`DonationRecord`], [`DonationForm`](crate::donation::DonationForm),
//! gateway [`Transaction`]s) are reused as-is; this module only holds the
//! envelopes around them.
//!
//! ## Model Categories
//!
//! - **Submissions**: outcome of one run of the donation state machine
//! - **Back office**: listing filters and manual status updates
//! - **Gateway utilities**: history window, withdrawals, cached lookups

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::donation::{ManualInstructions, ManualOutcome, Phase, SuccessOutcome};
use crate::providers::Transaction;
use crate::storage::{DonationRecord, DonationStatus};

// =============================================================================
// Submission Models
// =============================================================================

/// Terminal outcome of `POST /v1/donations`.
///
/// `phase` is `success` when the gateway accepted the request and
/// `manual_instructions_shown` when it was unavailable. Both are 201: the
/// attempt was recorded either way.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DonationSubmissionResponse {
    pub phase: Phase,
    pub record: DonationRecord,
    /// Redirect target for the hosted payment page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_link: Option<String>,
    /// Present on the manual path only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<ManualInstructions>,
    /// Printable form of `instructions`, quoting the donation reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions_text: Option<String>,
    pub message: String,
}

impl From<SuccessOutcome> for DonationSubmissionResponse {
    fn from(outcome: SuccessOutcome) -> Self {
        let message = match &outcome.payment_link {
            Some(_) => format!(
                "Thank you! Complete your donation on the payment page (reference {}).",
                outcome.record.reference
            ),
            None => format!(
                "Thank you! Confirm the payment on your phone (reference {}).",
                outcome.record.reference
            ),
        };
        Self {
            phase: Phase::Success,
            record: outcome.record,
            payment_link: outcome.payment_link,
            instructions: None,
            instructions_text: None,
            message,
        }
    }
}

impl From<ManualOutcome> for DonationSubmissionResponse {
    fn from(outcome: ManualOutcome) -> Self {
        let instructions_text = outcome.instructions.render(&outcome.record.reference);
        Self {
            phase: Phase::ManualInstructionsShown,
            record: outcome.record,
            payment_link: None,
            instructions_text: Some(instructions_text),
            instructions: Some(outcome.instructions),
            message: outcome.message,
        }
    }
}

/// Body of a 422 for a rejected donation form.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub error: String,
    /// Form field that failed (`amount`, `donor_phone`, ...).
    pub field: String,
}

// =============================================================================
// Back-office Models
// =============================================================================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DonationListQuery {
    /// Only return records in this status.
    pub status: Option<DonationStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateDonationStatusRequest {
    pub status: DonationStatus,
    /// Appended to the record's notes.
    #[serde(default)]
    pub note: Option<String>,
}

// =============================================================================
// Gateway Utility Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryRequest {
    #[schema(value_type = String, format = Date, example = "2026-01-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2026-01-31")]
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawRequest {
    /// Amount in major units, e.g. "25000".
    pub amount: String,
    /// Recipient subscriber number; normalized before use.
    pub to: String,
    pub description: String,
    /// Generated when omitted.
    #[serde(default)]
    pub external_reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionLookupResponse {
    pub transaction: Transaction,
    /// Whether the answer came from the local status cache.
    pub cached: bool,
}
