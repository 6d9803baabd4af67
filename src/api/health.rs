// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Data directory write/read probe. Absent when records live in memory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// "authenticated" (unexpired session), "configured" or "not_configured".
    /// Informational only: without a gateway donations take the
    /// manual-instructions path.
    pub gateway: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

fn check_data_dir(state: &AppState) -> Option<String> {
    state.storage.as_ref().map(|storage| match storage.health_check() {
        Ok(()) => "ok".to_string(),
        Err(_) => "unavailable".to_string(),
    })
}

async fn check_gateway(state: &AppState) -> String {
    let Some(client) = &state.campay else {
        return "not_configured".to_string();
    };
    let fresh = client
        .cached_session()
        .await
        .is_some_and(|session| session.is_valid_at(Utc::now()));
    let status = if fresh { "authenticated" } else { "configured" };
    status.to_string()
}

/// Health check endpoint handler.
///
/// Returns 200 if the record store is usable, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let data_dir = check_data_dir(&state);
    let gateway = check_gateway(&state).await;

    let all_ok = data_dir.as_ref().map(|s| s == "ok").unwrap_or(true);

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            data_dir,
            gateway,
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{routing::post, Router};
    use serde_json::json;

    use super::*;
    use crate::config::GatewayConfig;
    use crate::providers::CampayClient;
    use crate::storage::{JsonStorage, StoragePaths};

    #[tokio::test]
    async fn liveness_is_always_ok() {
        let Json(body) = liveness().await;
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn in_memory_state_is_healthy_without_gateway() {
        let (status, Json(body)) = health(State(AppState::default())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.checks.data_dir.is_none());
        assert_eq!(body.checks.gateway, "not_configured");
    }

    async fn token_server(expires_in: u64) -> String {
        let app = Router::new().route(
            "/token/",
            post(move || async move { Json(json!({ "token": "tok", "expires_in": expires_in })) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn state_with_session(expires_in: u64) -> AppState {
        let client = CampayClient::new(&GatewayConfig {
            base_url: token_server(expires_in).await,
            username: "church".to_string(),
            password: "secret".to_string(),
            currency: "XAF".to_string(),
        })
        .unwrap();
        client.authenticate().await.unwrap();
        AppState::default().with_campay(Arc::new(client))
    }

    #[tokio::test]
    async fn gateway_reports_fresh_session_as_authenticated() {
        let (status, Json(body)) = health(State(state_with_session(3600).await)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.checks.gateway, "authenticated");
    }

    #[tokio::test]
    async fn expired_session_is_only_configured() {
        // Lifetime below the safety margin caches an already expired session.
        let state = state_with_session(60).await;
        let (status, Json(body)) = health(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.checks.gateway, "configured");
    }

    #[tokio::test]
    async fn readiness_probes_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(StoragePaths::new(dir.path()));
        storage.initialize().unwrap();
        let state = AppState::default().with_storage(Arc::new(storage));

        let (status, Json(body)) = readiness(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.checks.data_dir.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn uninitialized_storage_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(StoragePaths::new(dir.path()));
        let state = AppState::default().with_storage(Arc::new(storage));

        let (status, Json(body)) = readiness(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
    }
}
