// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CamPay mobile-money gateway client.
//!
//! ## Session handling
//!
//! CamPay issues a bearer-style token from `POST /token/` that must be sent
//! as `Authorization: Token {token}`. The token is cached in process memory
//! and reused while `now < expires_at`. The cached lifetime is the provider's
//! stated lifetime minus [`TOKEN_SAFETY_MARGIN_SECS`], so a request never
//! starts with a token that is about to expire.
//!
//! Authentication failures are never retried here; the caller decides
//! whether to degrade or surface the error.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, IntoUrl, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use super::{
    Balance, CollectRequest, GatewayError, PaymentGateway, PaymentLink, PaymentLinkRequest,
    Transaction,
};
use crate::config::GatewayConfig;

/// Lifetime assumed when the token response does not state one.
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;
/// Subtracted from the provider's token lifetime before caching.
const TOKEN_SAFETY_MARGIN_SECS: u64 = 600;
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Cached gateway credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySession {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl GatewaySession {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CampayClient {
    base_url: String,
    username: String,
    password: String,
    session: Arc<RwLock<Option<GatewaySession>>>,
    http: Client,
}

impl CampayClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        if config.username.trim().is_empty() {
            return Err(GatewayError::MissingConfig("gateway username".to_string()));
        }
        if config.password.trim().is_empty() {
            return Err(GatewayError::MissingConfig("gateway password".to_string()));
        }

        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            session: Arc::new(RwLock::new(None)),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange credentials for a fresh token and cache it.
    pub async fn authenticate(&self) -> Result<GatewaySession, GatewayError> {
        let response = self
            .http
            .post(self.endpoint("/token/"))
            .json(&json!({
                "username": self.username,
                "password": self.password,
            }))
            .send()
            .await
            .map_err(|e| GatewayError::Auth(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Auth(format!(
                "token request returned {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Auth(format!("invalid token response: {e}")))?;

        if token_response.token.trim().is_empty() {
            return Err(GatewayError::Auth(
                "token response did not include a token".to_string(),
            ));
        }

        let lifetime = token_response
            .expires_in
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let cached_for = lifetime.saturating_sub(TOKEN_SAFETY_MARGIN_SECS);
        let session = GatewaySession {
            access_token: token_response.token,
            expires_at: Utc::now() + chrono::Duration::seconds(cached_for as i64),
        };

        *self.session.write().await = Some(session.clone());
        info!(
            expires_at = %session.expires_at,
            "gateway session established"
        );
        Ok(session)
    }

    /// Currently cached session, if any (expired or not).
    pub async fn cached_session(&self) -> Option<GatewaySession> {
        self.session.read().await.clone()
    }

    /// Reuse the cached token while it is fresh, otherwise re-authenticate.
    async fn ensure_session(&self) -> Result<String, GatewayError> {
        {
            let session = self.session.read().await;
            if let Some(session) = &*session {
                if session.is_valid_at(Utc::now()) {
                    return Ok(session.access_token.clone());
                }
            }
        }
        debug!("gateway session missing or expired, re-authenticating");
        Ok(self.authenticate().await?.access_token)
    }

    /// `GET {base}/utilities/transaction/{reference}/`.
    pub async fn utility_transaction_status(
        &self,
        reference: &str,
    ) -> Result<Transaction, GatewayError> {
        let response = self
            .get_url(
                self.reference_endpoint(&["utilities", "transaction"], reference)?,
                "/utilities/transaction/",
            )
            .await?;
        parse_transaction(response)
    }

    pub async fn balance(&self) -> Result<Balance, GatewayError> {
        let response = self.get_json("/balance/").await?;
        serde_json::from_value(response)
            .map_err(|e| GatewayError::InvalidResponse(format!("balance: {e}")))
    }

    /// Transactions between two `YYYY-MM-DD` dates (inclusive).
    pub async fn history(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<Transaction>, GatewayError> {
        let response = self
            .post_json(
                "/history/",
                &json!({
                    "start_date": start_date,
                    "end_date": end_date,
                }),
            )
            .await?;

        // Some deployments wrap the array in `{ "data": [...] }`.
        let items = match response {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(GatewayError::InvalidResponse(
                        "history response is not an array".to_string(),
                    ))
                }
            },
            _ => {
                return Err(GatewayError::InvalidResponse(
                    "history response is not an array".to_string(),
                ))
            }
        };

        items.into_iter().map(parse_transaction).collect()
    }

    /// Pay out from the merchant account to a subscriber number.
    pub async fn withdraw(
        &self,
        amount: &str,
        to: &str,
        description: &str,
        external_reference: &str,
    ) -> Result<Transaction, GatewayError> {
        let response = self
            .post_json(
                "/withdraw/",
                &json!({
                    "amount": amount,
                    "to": to,
                    "description": description,
                    "external_reference": external_reference,
                }),
            )
            .await?;
        parse_transaction(response)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base}/{prefix..}/{reference}/` with the reference encoded as a
    /// single path segment (`/` becomes `%2F`).
    fn reference_endpoint(&self, prefix: &[&str], reference: &str) -> Result<Url, GatewayError> {
        if reference.trim().is_empty() || reference == "." || reference == ".." {
            return Err(GatewayError::InvalidReference(reference.to_string()));
        }
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| GatewayError::MissingConfig(format!("invalid gateway base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::MissingConfig(format!(
                    "gateway base URL cannot take a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(prefix)
            .push(reference)
            .push("");
        Ok(url)
    }

    async fn get_json(&self, path: &str) -> Result<Value, GatewayError> {
        self.get_url(self.endpoint(path), path).await
    }

    async fn get_url(&self, url: impl IntoUrl, label: &str) -> Result<Value, GatewayError> {
        let token = self.ensure_session().await?;
        let request = self
            .http
            .get(url)
            .header("Authorization", format!("Token {token}"));
        send_json(request, "GET", label).await
    }

    async fn post_json(&self, path: &str, payload: &Value) -> Result<Value, GatewayError> {
        let token = self.ensure_session().await?;
        let request = self
            .http
            .post(self.endpoint(path))
            .header("Authorization", format!("Token {token}"))
            .json(payload);
        send_json(request, "POST", path).await
    }
}

#[async_trait]
impl PaymentGateway for CampayClient {
    async fn create_payment_link(
        &self,
        request: PaymentLinkRequest<'_>,
    ) -> Result<PaymentLink, GatewayError> {
        let response = self
            .post_json(
                "/get_payment_link/",
                &json!({
                    "amount": request.amount,
                    "currency": request.currency,
                    "description": request.description,
                    "external_reference": request.external_reference,
                    "redirect_url": request.redirect_url,
                }),
            )
            .await?;

        let payment_link = response
            .get("payment_link")
            .and_then(Value::as_str)
            .or_else(|| response.get("url").and_then(Value::as_str))
            .ok_or_else(|| {
                GatewayError::InvalidResponse("missing payment link in response".to_string())
            })?
            .to_string();

        let reference = response
            .get("reference")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        Ok(PaymentLink {
            payment_link,
            reference,
        })
    }

    async fn collect_direct(
        &self,
        request: CollectRequest<'_>,
    ) -> Result<Transaction, GatewayError> {
        let response = self
            .post_json(
                "/collect/",
                &json!({
                    "amount": request.amount,
                    "from": request.phone,
                    "description": request.description,
                    "external_reference": request.external_reference,
                }),
            )
            .await?;
        parse_transaction(response)
    }

    async fn query_status(&self, reference: &str) -> Result<Transaction, GatewayError> {
        let response = self
            .get_url(
                self.reference_endpoint(&["transaction"], reference)?,
                "/transaction/",
            )
            .await?;
        parse_transaction(response)
    }
}

async fn send_json(
    request: RequestBuilder,
    method: &str,
    path: &str,
) -> Result<Value, GatewayError> {
    let response = request
        .send()
        .await
        .map_err(|e| GatewayError::Transport(format!("{method} {path} failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        return Err(GatewayError::Http {
            status,
            body: parse_error_body(&text),
        });
    }

    response
        .json()
        .await
        .map_err(|e| GatewayError::InvalidResponse(format!("{method} {path} invalid JSON: {e}")))
}

/// Non-JSON error bodies collapse to an empty object.
fn parse_error_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({}))
}

fn parse_transaction(value: Value) -> Result<Transaction, GatewayError> {
    serde_json::from_value(value)
        .map_err(|e| GatewayError::InvalidResponse(format!("transaction: {e}")))
}
