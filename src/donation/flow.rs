// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Donation Submission State Machine
//!
//! ```text
//! Idle -> Validating -> ValidationFailed
//!                    -> Authorizing -> Recording -> Success
//!                                   -> Degraded  -> ManualInstructionsShown
//! ```
//!
//! The gateway outcome decides the terminal state. Storage failures are
//! logged and never change it: a donor who was sent to a payment page must
//! not be told otherwise because a local receipt failed to write.
//!
//! `submit` borrows the machine mutably, so one machine never has two
//! attempts in flight. Independent machines (e.g. concurrent HTTP requests)
//! are not coordinated and each creates its own external reference.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use super::instructions::ManualInstructions;
use super::intent::{DonationForm, DonationIntent, ValidationError};
use crate::config::{DEFAULT_CURRENCY, DEFAULT_REDIRECT_URL};
use crate::providers::{CollectRequest, GatewayError, PaymentGateway, PaymentLinkRequest};
use crate::storage::{DonationNotes, DonationRecord, DonationStore, PaymentMethod};

/// Reassuring text shown on the degraded path. Never carries the raw error.
pub const MANUAL_FALLBACK_MESSAGE: &str = "Your donation was recorded. Online payment is \
     temporarily unavailable, so you will receive manual payment instructions below.";

/// How the gateway is asked to collect funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CollectionMode {
    /// Hosted payment page; the donor is redirected to it.
    #[default]
    PaymentLink,
    /// Push request to the donor's handset.
    DirectCollection,
}

impl FromStr for CollectionMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "payment_link" | "link" => Ok(Self::PaymentLink),
            "direct" | "direct_collection" | "collect" => Ok(Self::DirectCollection),
            other => Err(format!("unknown collection mode: {other}")),
        }
    }
}

/// Deployment settings the flow needs on every submission.
#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub redirect_url: String,
    pub currency: String,
    pub mode: CollectionMode,
    pub instructions: ManualInstructions,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            mode: CollectionMode::default(),
            instructions: ManualInstructions::default(),
        }
    }
}

/// Coarse state name, used for the transition trail and API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Validating,
    Authorizing,
    Recording,
    Success,
    ValidationFailed,
    Degraded,
    ManualInstructionsShown,
}

/// Gateway accepted the request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SuccessOutcome {
    pub record: DonationRecord,
    /// Where to redirect the donor, when the gateway issued a link.
    pub payment_link: Option<String>,
}

/// Gateway unavailable; the attempt was kept for manual follow-up.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ManualOutcome {
    pub record: DonationRecord,
    pub instructions: ManualInstructions,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Authorizing,
    Recording,
    Success(SuccessOutcome),
    ValidationFailed(ValidationError),
    Degraded,
    ManualInstructionsShown(ManualOutcome),
}

impl SubmissionState {
    pub fn phase(&self) -> Phase {
        match self {
            SubmissionState::Idle => Phase::Idle,
            SubmissionState::Validating => Phase::Validating,
            SubmissionState::Authorizing => Phase::Authorizing,
            SubmissionState::Recording => Phase::Recording,
            SubmissionState::Success(_) => Phase::Success,
            SubmissionState::ValidationFailed(_) => Phase::ValidationFailed,
            SubmissionState::Degraded => Phase::Degraded,
            SubmissionState::ManualInstructionsShown(_) => Phase::ManualInstructionsShown,
        }
    }

    /// States a submission can end in.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Success(_)
                | SubmissionState::ValidationFailed(_)
                | SubmissionState::ManualInstructionsShown(_)
        )
    }
}

/// Shared collaborators for every submission. Cheap to clone.
#[derive(Clone)]
pub struct DonationService {
    gateway: Option<Arc<dyn PaymentGateway>>,
    store: Arc<dyn DonationStore>,
    notes: Option<Arc<dyn DonationNotes>>,
    settings: FlowSettings,
}

impl DonationService {
    /// A service without a gateway sends every valid submission down the
    /// manual-instructions path.
    pub fn new(store: Arc<dyn DonationStore>, settings: FlowSettings) -> Self {
        Self {
            gateway: None,
            store,
            notes: None,
            settings,
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_notes(mut self, notes: Arc<dyn DonationNotes>) -> Self {
        self.notes = Some(notes);
        self
    }

    pub fn store(&self) -> &Arc<dyn DonationStore> {
        &self.store
    }

    pub fn gateway(&self) -> Option<&Arc<dyn PaymentGateway>> {
        self.gateway.as_ref()
    }

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    /// Start a fresh state machine in `Idle`.
    pub fn flow(&self) -> DonationFlow {
        DonationFlow::new(self.clone())
    }

    async fn initiate(
        &self,
        intent: &DonationIntent,
        record: &DonationRecord,
    ) -> Result<Initiated, GatewayError> {
        let Some(gateway) = &self.gateway else {
            return Err(GatewayError::MissingConfig(
                "payment gateway credentials are not configured".to_string(),
            ));
        };

        let amount = intent.amount.to_string();
        let description = intent.description();
        match self.settings.mode {
            CollectionMode::PaymentLink => {
                let link = gateway
                    .create_payment_link(PaymentLinkRequest {
                        amount: &amount,
                        currency: &intent.currency,
                        description: &description,
                        external_reference: &record.external_reference,
                        redirect_url: &self.settings.redirect_url,
                    })
                    .await?;
                Ok(Initiated {
                    reference: link.reference,
                    payment_link: Some(link.payment_link),
                })
            }
            CollectionMode::DirectCollection => {
                let transaction = gateway
                    .collect_direct(CollectRequest {
                        amount: &amount,
                        phone: intent.donor_phone.as_str(),
                        description: &description,
                        external_reference: &record.external_reference,
                    })
                    .await?;
                Ok(Initiated {
                    reference: Some(transaction.reference),
                    payment_link: None,
                })
            }
        }
    }

    fn persist(&self, record: &DonationRecord) {
        if let Err(error) = self.store.append(record) {
            warn!(
                donation_id = %record.id,
                status = record.status.as_str(),
                error = %error,
                "Failed to persist donation record"
            );
        }
    }

    fn leave_note(&self, record: &DonationRecord) {
        let Some(notes) = &self.notes else {
            return;
        };
        if let Err(error) = notes.record_donation_note(record) {
            warn!(
                donation_id = %record.id,
                error = %error,
                "Failed to record donation note"
            );
        }
    }
}

struct Initiated {
    reference: Option<String>,
    payment_link: Option<String>,
}

/// One donor's submission state machine.
pub struct DonationFlow {
    service: DonationService,
    state: SubmissionState,
    transitions: Vec<Phase>,
}

impl DonationFlow {
    pub fn new(service: DonationService) -> Self {
        Self {
            service,
            state: SubmissionState::Idle,
            transitions: vec![Phase::Idle],
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Every phase entered so far, oldest first.
    pub fn transitions(&self) -> &[Phase] {
        &self.transitions
    }

    /// Back to `Idle`. The form is reset by the caller at this point.
    pub fn reset(&mut self) {
        if self.state.phase() != Phase::Idle {
            self.enter(SubmissionState::Idle);
        }
    }

    /// Run one submission to a terminal state.
    pub async fn submit(&mut self, form: DonationForm) -> &SubmissionState {
        self.reset();
        self.enter(SubmissionState::Validating);

        let intent = match DonationIntent::from_form(form, &self.service.settings.currency) {
            Ok(intent) => intent,
            Err(error) => {
                info!(field = error.field(), error = %error, "Donation form rejected");
                self.enter(SubmissionState::ValidationFailed(error));
                return &self.state;
            }
        };

        let mut record = DonationRecord::new_pending(&intent, PaymentMethod::MobileGateway);
        self.enter(SubmissionState::Authorizing);

        let outcome = self.service.initiate(&intent, &record).await;
        match outcome {
            Ok(initiated) => {
                self.enter(SubmissionState::Recording);
                if let Err(error) =
                    record.mark_gateway_initiated(initiated.reference, initiated.payment_link.clone())
                {
                    warn!(error = %error, "Fresh donation record refused gateway status");
                }
                self.service.persist(&record);
                info!(
                    donation_id = %record.id,
                    reference = %record.reference,
                    amount = %record.amount,
                    "Donation initiated with gateway"
                );
                self.service.leave_note(&record);
                self.enter(SubmissionState::Success(SuccessOutcome {
                    record,
                    payment_link: initiated.payment_link,
                }));
            }
            Err(error) => {
                warn!(
                    donation_id = %record.id,
                    external_reference = %record.external_reference,
                    error = %error,
                    "Gateway unavailable, falling back to manual instructions"
                );
                self.enter(SubmissionState::Degraded);
                record.payment_method = PaymentMethod::BankTransfer;
                if let Err(error) =
                    record.mark_pending_manual(&format!("Gateway unavailable: {error}"))
                {
                    warn!(error = %error, "Fresh donation record refused manual status");
                }
                self.service.persist(&record);
                let instructions = self.service.settings.instructions.clone();
                self.enter(SubmissionState::ManualInstructionsShown(ManualOutcome {
                    record,
                    instructions,
                    message: MANUAL_FALLBACK_MESSAGE.to_string(),
                }));
            }
        }

        &self.state
    }

    fn enter(&mut self, next: SubmissionState) {
        let phase = next.phase();
        debug!(from = ?self.state.phase(), to = ?phase, "Donation flow transition");
        self.transitions.push(phase);
        self.state = next;
    }
}
