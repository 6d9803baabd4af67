// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Back-office passthroughs to the payment gateway.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::{
    auth::AdminAuth,
    donation::Amount,
    error::ApiError,
    models::{HistoryRequest, TransactionLookupResponse, WithdrawRequest},
    phone,
    providers::{Balance, CampayClient, Transaction},
    state::AppState,
    storage::repository::generate_external_reference,
};

/// Gateway utilities need the concrete client, not just the payment seam.
fn campay(state: &AppState) -> Result<&Arc<CampayClient>, ApiError> {
    state
        .campay
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Payment gateway is not configured"))
}

#[utoipa::path(
    get,
    path = "/v1/gateway/balance",
    tag = "Gateway",
    security(("admin_token" = [])),
    responses(
        (status = 200, body = Balance),
        (status = 502, description = "Gateway error"),
        (status = 503, description = "Gateway not configured")
    )
)]
pub async fn balance(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Balance>, ApiError> {
    Ok(Json(campay(&state)?.balance().await?))
}

#[utoipa::path(
    post,
    path = "/v1/gateway/history",
    request_body = HistoryRequest,
    tag = "Gateway",
    security(("admin_token" = [])),
    responses(
        (status = 200, body = [Transaction]),
        (status = 400, description = "Start date after end date"),
        (status = 502, description = "Gateway error")
    )
)]
pub async fn history(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(request): Json<HistoryRequest>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    if request.start_date > request.end_date {
        return Err(ApiError::bad_request("start_date must not be after end_date"));
    }
    let client = campay(&state)?;
    let transactions = client
        .history(
            &request.start_date.format("%Y-%m-%d").to_string(),
            &request.end_date.format("%Y-%m-%d").to_string(),
        )
        .await?;
    Ok(Json(transactions))
}

/// Pay out from the merchant account to a mobile-money number.
#[utoipa::path(
    post,
    path = "/v1/gateway/withdraw",
    request_body = WithdrawRequest,
    tag = "Gateway",
    security(("admin_token" = [])),
    responses(
        (status = 200, body = Transaction),
        (status = 400, description = "Invalid amount, phone or description"),
        (status = 502, description = "Gateway error")
    )
)]
pub async fn withdraw(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(request): Json<WithdrawRequest>,
) -> Result<Json<Transaction>, ApiError> {
    let amount: Amount = request
        .amount
        .parse()
        .map_err(|_| ApiError::bad_request("amount must be a positive number"))?;
    let to = phone::normalize(&request.to);
    if !to.is_valid() {
        return Err(ApiError::bad_request("to must be a valid phone number"));
    }
    let description = request.description.trim();
    if description.is_empty() {
        return Err(ApiError::bad_request("description is required"));
    }
    let external_reference = request
        .external_reference
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(generate_external_reference);

    let client = campay(&state)?;
    let transaction = client
        .withdraw(
            &amount.to_string(),
            to.as_str(),
            description,
            &external_reference,
        )
        .await?;
    info!(
        reference = %transaction.reference,
        external_reference = %external_reference,
        amount = %amount,
        "Gateway withdrawal requested"
    );
    Ok(Json(transaction))
}

/// Current gateway status of a transaction, served from a short-lived cache.
#[utoipa::path(
    get,
    path = "/v1/gateway/transactions/{reference}",
    params(("reference" = String, Path, description = "Gateway transaction reference")),
    tag = "Gateway",
    security(("admin_token" = [])),
    responses(
        (status = 200, body = TransactionLookupResponse),
        (status = 502, description = "Gateway error")
    )
)]
pub async fn transaction_status(
    _admin: AdminAuth,
    Path(reference): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TransactionLookupResponse>, ApiError> {
    if let Some(transaction) = state.status_cache.get(&reference) {
        return Ok(Json(TransactionLookupResponse {
            transaction,
            cached: true,
        }));
    }

    let transaction = campay(&state)?
        .utility_transaction_status(&reference)
        .await?;
    state.status_cache.put(&reference, transaction.clone());
    Ok(Json(TransactionLookupResponse {
        transaction,
        cached: false,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post},
        Router,
    };
    use serde_json::{json, Value};

    use super::*;
    use crate::config::GatewayConfig;

    #[derive(Default)]
    struct Upstream {
        status_calls: AtomicUsize,
    }

    async fn spawn(upstream: Arc<Upstream>) -> String {
        let app = Router::new()
            .route("/token/", post(|| async { Json(json!({ "token": "tok" })) }))
            .route(
                "/balance/",
                get(|| async { Json(json!({ "total_balance": "1500", "currency": "XAF" })) }),
            )
            .route(
                "/withdraw/",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    if headers.get("Authorization").and_then(|v| v.to_str().ok())
                        != Some("Token tok")
                    {
                        return StatusCode::UNAUTHORIZED.into_response();
                    }
                    Json(json!({
                        "reference": "WD-1",
                        "amount": body["amount"],
                        "status": "PENDING",
                        "external_reference": body["external_reference"],
                        "description": body["to"],
                    }))
                    .into_response()
                }),
            )
            .route(
                "/utilities/transaction/{reference}/",
                get(
                    |State(upstream): State<Arc<Upstream>>,
                     axum::extract::Path(reference): axum::extract::Path<String>| async move {
                        upstream.status_calls.fetch_add(1, Ordering::SeqCst);
                        Json(json!({ "reference": reference, "status": "SUCCESSFUL" }))
                    },
                ),
            )
            .with_state(upstream);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn state_for(upstream: Arc<Upstream>) -> AppState {
        let client = CampayClient::new(&GatewayConfig {
            base_url: spawn(upstream).await,
            username: "church".to_string(),
            password: "secret".to_string(),
            currency: "XAF".to_string(),
        })
        .unwrap();
        AppState::default().with_campay(Arc::new(client))
    }

    #[tokio::test]
    async fn balance_passes_through() {
        let state = state_for(Arc::new(Upstream::default())).await;
        let Json(balance) = balance(AdminAuth, State(state)).await.unwrap();
        assert_eq!(balance.balance.as_deref(), Some("1500"));
    }

    #[tokio::test]
    async fn unconfigured_gateway_is_unavailable() {
        let error = balance(AdminAuth, State(AppState::default()))
            .await
            .unwrap_err();
        assert_eq!(error.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn history_rejects_inverted_window() {
        let request = HistoryRequest {
            start_date: chrono::NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        };
        let error = history(AdminAuth, State(AppState::default()), Json(request))
            .await
            .unwrap_err();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn withdraw_normalizes_phone_and_generates_reference() {
        let state = state_for(Arc::new(Upstream::default())).await;
        let Json(tx) = withdraw(
            AdminAuth,
            State(state),
            Json(WithdrawRequest {
                amount: "25000".to_string(),
                to: "0690 12 34 56".to_string(),
                description: "Refund".to_string(),
                external_reference: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(tx.reference, "WD-1");
        assert_eq!(tx.amount.as_deref(), Some("25000"));
        assert_eq!(tx.description.as_deref(), Some("237690123456"));
        assert!(tx.external_reference.unwrap().starts_with("DON-"));
    }

    #[tokio::test]
    async fn withdraw_rejects_invalid_input() {
        let state = AppState::default();
        let error = withdraw(
            AdminAuth,
            State(state),
            Json(WithdrawRequest {
                amount: "25000".to_string(),
                to: "12".to_string(),
                description: "Refund".to_string(),
                external_reference: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn transaction_lookup_is_cached() {
        let upstream = Arc::new(Upstream::default());
        let state = state_for(upstream.clone()).await;

        let Json(first) = transaction_status(AdminAuth, Path("CP-7".to_string()), State(state.clone()))
            .await
            .unwrap();
        let Json(second) = transaction_status(AdminAuth, Path("cp-7".to_string()), State(state))
            .await
            .unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(second.transaction.reference, "CP-7");
        assert_eq!(upstream.status_calls.load(Ordering::SeqCst), 1);
    }
}
