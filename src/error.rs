// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::donation::SyncError;
use crate::providers::GatewayError;
use crate::storage::StorageError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => Self::not_found(format!("{what} not found")),
            StorageError::InvalidTransition(e) => Self::conflict(e.to_string()),
            other => {
                error!(error = %other, "Record store failure");
                Self::internal("Record store unavailable")
            }
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::MissingConfig(msg) => Self::service_unavailable(msg),
            GatewayError::InvalidReference(reference) => {
                Self::bad_request(format!("Invalid transaction reference `{reference}`"))
            }
            GatewayError::Http { status, .. } => {
                Self::bad_gateway(format!("Payment gateway returned HTTP {status}"))
            }
            other => Self::bad_gateway(other.to_string()),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Storage(e) => e.into(),
            SyncError::Gateway(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DonationStatus, StatusTransitionError};
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        assert_eq!(ApiError::conflict("c").status, StatusCode::CONFLICT);
        assert_eq!(
            ApiError::service_unavailable("s").status,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ApiError::bad_gateway("g").status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn storage_errors_map_to_http_statuses() {
        let nf: ApiError = StorageError::NotFound("Donation x".to_string()).into();
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "Donation x not found");

        let conflict: ApiError = StorageError::InvalidTransition(StatusTransitionError {
            id: "x".to_string(),
            from: DonationStatus::Completed,
            to: DonationStatus::Failed,
        })
        .into();
        assert_eq!(conflict.status, StatusCode::CONFLICT);

        let io: ApiError = StorageError::Io(std::io::Error::other("disk")).into();
        assert_eq!(io.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!io.message.contains("disk"));
    }

    #[test]
    fn gateway_errors_map_to_http_statuses() {
        let missing: ApiError = GatewayError::MissingConfig("no creds".to_string()).into();
        assert_eq!(missing.status, StatusCode::SERVICE_UNAVAILABLE);

        let upstream: ApiError = GatewayError::Http {
            status: 500,
            body: serde_json::json!({}),
        }
        .into();
        assert_eq!(upstream.status, StatusCode::BAD_GATEWAY);
        assert_eq!(upstream.message, "Payment gateway returned HTTP 500");

        let reference: ApiError = GatewayError::InvalidReference("..".to_string()).into();
        assert_eq!(reference.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }
}
