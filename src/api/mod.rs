// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    donation::{
        CollectionMode, DonationForm, DonationType, ManualInstructions, Phase, SyncOutcome,
    },
    models::{
        DonationSubmissionResponse, HistoryRequest, TransactionLookupResponse,
        UpdateDonationStatusRequest, ValidationErrorResponse, WithdrawRequest,
    },
    providers::{Balance, Transaction, TransactionState},
    state::AppState,
    storage::{DonationRecord, DonationStatus, PaymentMethod},
};

pub mod donations;
pub mod gateway;
pub mod health;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/donations",
            get(donations::list_donations).post(donations::submit_donation),
        )
        .route("/donations/{donation_id}", get(donations::get_donation))
        .route(
            "/donations/{donation_id}/status",
            put(donations::update_donation_status),
        )
        .route(
            "/donations/{donation_id}/sync",
            post(donations::sync_donation),
        )
        .route("/gateway/balance", get(gateway::balance))
        .route("/gateway/history", post(gateway::history))
        .route("/gateway/withdraw", post(gateway::withdraw))
        .route(
            "/gateway/transactions/{reference}",
            get(gateway::transaction_status),
        )
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

struct AdminTokenScheme;

impl Modify for AdminTokenScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_token",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        donations::submit_donation,
        donations::list_donations,
        donations::get_donation,
        donations::update_donation_status,
        donations::sync_donation,
        gateway::balance,
        gateway::history,
        gateway::withdraw,
        gateway::transaction_status,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            DonationForm,
            DonationType,
            DonationRecord,
            DonationStatus,
            PaymentMethod,
            DonationSubmissionResponse,
            ValidationErrorResponse,
            ManualInstructions,
            CollectionMode,
            Phase,
            UpdateDonationStatusRequest,
            SyncOutcome,
            Transaction,
            TransactionState,
            Balance,
            HistoryRequest,
            WithdrawRequest,
            TransactionLookupResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&AdminTokenScheme),
    tags(
        (name = "Donations", description = "Donation submission and back-office records"),
        (name = "Gateway", description = "Mobile-money gateway utilities"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
