// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Donation submission and back-office record routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info};

use crate::{
    auth::AdminAuth,
    donation::{sync_record, DonationForm, SubmissionState, SyncOutcome},
    error::ApiError,
    models::{
        DonationListQuery, DonationSubmissionResponse, UpdateDonationStatusRequest,
        ValidationErrorResponse,
    },
    state::AppState,
    storage::DonationRecord,
};

/// Why a submission did not produce a 201.
#[derive(Debug)]
pub enum SubmissionRejected {
    Invalid(ValidationErrorResponse),
    Internal(ApiError),
}

impl IntoResponse for SubmissionRejected {
    fn into_response(self) -> Response {
        match self {
            SubmissionRejected::Invalid(body) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            SubmissionRejected::Internal(err) => err.into_response(),
        }
    }
}

/// Run one donation through the submission state machine.
///
/// Both gateway success and the manual-instructions fallback are 201: the
/// attempt is recorded in either case.
#[utoipa::path(
    post,
    path = "/v1/donations",
    request_body = DonationForm,
    tag = "Donations",
    responses(
        (status = 201, description = "Donation recorded", body = DonationSubmissionResponse),
        (status = 422, description = "Form rejected", body = ValidationErrorResponse)
    )
)]
pub async fn submit_donation(
    State(state): State<AppState>,
    Json(form): Json<DonationForm>,
) -> Result<(StatusCode, Json<DonationSubmissionResponse>), SubmissionRejected> {
    let mut flow = state.donations.flow();
    match flow.submit(form).await.clone() {
        SubmissionState::Success(outcome) => {
            Ok((StatusCode::CREATED, Json(outcome.into())))
        }
        SubmissionState::ManualInstructionsShown(outcome) => {
            Ok((StatusCode::CREATED, Json(outcome.into())))
        }
        SubmissionState::ValidationFailed(err) => {
            Err(SubmissionRejected::Invalid(ValidationErrorResponse {
                error: err.to_string(),
                field: err.field().to_string(),
            }))
        }
        other => {
            error!(phase = ?other.phase(), "Donation flow stopped in a non-terminal state");
            Err(SubmissionRejected::Internal(ApiError::internal(
                "Donation could not be processed",
            )))
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/donations",
    params(DonationListQuery),
    tag = "Donations",
    security(("admin_token" = [])),
    responses(
        (status = 200, body = [DonationRecord]),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 503, description = "Admin access not configured")
    )
)]
pub async fn list_donations(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(params): Query<DonationListQuery>,
) -> Result<Json<Vec<DonationRecord>>, ApiError> {
    let records = match params.status {
        Some(status) => state.store().list_by_status(status)?,
        None => state.store().list()?,
    };
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/v1/donations/{donation_id}",
    params(("donation_id" = String, Path, description = "Donation record id")),
    tag = "Donations",
    security(("admin_token" = [])),
    responses(
        (status = 200, body = DonationRecord),
        (status = 404, description = "Unknown donation")
    )
)]
pub async fn get_donation(
    _admin: AdminAuth,
    Path(donation_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DonationRecord>, ApiError> {
    Ok(Json(state.store().get(&donation_id)?))
}

/// Manual status change, e.g. confirming a bank transfer.
#[utoipa::path(
    put,
    path = "/v1/donations/{donation_id}/status",
    params(("donation_id" = String, Path, description = "Donation record id")),
    request_body = UpdateDonationStatusRequest,
    tag = "Donations",
    security(("admin_token" = [])),
    responses(
        (status = 200, body = DonationRecord),
        (status = 404, description = "Unknown donation"),
        (status = 409, description = "Record is already completed or failed")
    )
)]
pub async fn update_donation_status(
    _admin: AdminAuth,
    Path(donation_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateDonationStatusRequest>,
) -> Result<Json<DonationRecord>, ApiError> {
    let record = state.store().update_status(
        &donation_id,
        request.status,
        request.note.as_deref(),
    )?;
    state.status_cache.invalidate(&record.reference);
    info!(
        donation_id = %record.id,
        status = record.status.as_str(),
        "Donation status updated by admin"
    );
    Ok(Json(record))
}

/// Reconcile one record with the gateway now instead of waiting for the poller.
#[utoipa::path(
    post,
    path = "/v1/donations/{donation_id}/sync",
    params(("donation_id" = String, Path, description = "Donation record id")),
    tag = "Donations",
    security(("admin_token" = [])),
    responses(
        (status = 200, body = SyncOutcome),
        (status = 404, description = "Unknown donation"),
        (status = 502, description = "Gateway error"),
        (status = 503, description = "Gateway not configured")
    )
)]
pub async fn sync_donation(
    _admin: AdminAuth,
    Path(donation_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SyncOutcome>, ApiError> {
    let gateway = state
        .donations
        .gateway()
        .ok_or_else(|| ApiError::service_unavailable("Payment gateway is not configured"))?;
    let outcome = sync_record(gateway.as_ref(), state.store().as_ref(), &donation_id).await?;
    if outcome.changed {
        state.status_cache.invalidate(&outcome.record.reference);
    }
    Ok(Json(outcome))
}
