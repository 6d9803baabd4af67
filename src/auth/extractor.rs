// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for back-office routes.
//!
//! ```rust,ignore
//! async fn list_donations(_admin: AdminAuth, State(state): State<AppState>) -> ... {}
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::AuthError;
use crate::state::AppState;

/// Proof that the request carried `Authorization: Bearer <ADMIN_API_TOKEN>`.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(admin_token) = &state.admin_token else {
            return Err(AuthError::NotConfigured);
        };

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        if admin_token.verify(token.trim()) {
            Ok(AdminAuth)
        } else {
            warn!(path = %parts.uri.path(), "Rejected admin request with invalid token");
            Err(AuthError::InvalidToken)
        }
    }
}
