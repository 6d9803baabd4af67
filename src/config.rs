// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding the donation record files | `./data` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `CAMPAY_BASE_URL` | Gateway API base URL | `https://demo.campay.net/api` |
//! | `CAMPAY_USERNAME` | Gateway API username | Required for online payments |
//! | `CAMPAY_PASSWORD` | Gateway API password | Required for online payments |
//! | `CAMPAY_CURRENCY` | Donation currency | `XAF` |
//! | `DONATION_REDIRECT_URL` | Where the hosted payment page sends donors back | `http://localhost:3000/dons/merci` |
//! | `DONATION_COLLECTION_MODE` | `payment_link` or `direct` | `payment_link` |
//! | `ADMIN_API_TOKEN` | Bearer token for back-office routes | Admin routes disabled |
//! | `STATUS_POLL_INTERVAL_SECS` | Reconciliation interval | `60` |
//! | `MANUAL_BANK_NAME` etc. | Manual payment instructions | see [`ManualInstructions`] |
//!
//! Without gateway credentials the service still accepts donations: every
//! submission takes the manual-instructions path.

use std::{path::PathBuf, time::Duration};

use crate::donation::{CollectionMode, FlowSettings, ManualInstructions};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
/// Directory holding `donations.json` and `contact_messages.json`.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const CAMPAY_BASE_URL_ENV: &str = "CAMPAY_BASE_URL";
pub const CAMPAY_USERNAME_ENV: &str = "CAMPAY_USERNAME";
pub const CAMPAY_PASSWORD_ENV: &str = "CAMPAY_PASSWORD";
pub const CAMPAY_CURRENCY_ENV: &str = "CAMPAY_CURRENCY";

pub const DONATION_REDIRECT_URL_ENV: &str = "DONATION_REDIRECT_URL";
pub const DONATION_COLLECTION_MODE_ENV: &str = "DONATION_COLLECTION_MODE";
pub const ADMIN_API_TOKEN_ENV: &str = "ADMIN_API_TOKEN";
pub const STATUS_POLL_INTERVAL_ENV: &str = "STATUS_POLL_INTERVAL_SECS";

pub const MANUAL_BANK_NAME_ENV: &str = "MANUAL_BANK_NAME";
pub const MANUAL_BANK_ACCOUNT_ENV: &str = "MANUAL_BANK_ACCOUNT";
pub const MANUAL_BANK_HOLDER_ENV: &str = "MANUAL_BANK_HOLDER";
pub const MANUAL_MOBILE_MONEY_ENV: &str = "MANUAL_MOBILE_MONEY_NUMBER";
pub const MANUAL_ORANGE_MONEY_ENV: &str = "MANUAL_ORANGE_MONEY_NUMBER";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_BASE_URL: &str = "https://demo.campay.net/api";
pub const DEFAULT_CURRENCY: &str = "XAF";
pub const DEFAULT_REDIRECT_URL: &str = "http://localhost:3000/dons/merci";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Gateway credentials and endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub currency: String,
}

impl GatewayConfig {
    /// `Ok(None)` when no credentials are configured at all; an error when
    /// only half of them are.
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        let username = lookup(CAMPAY_USERNAME_ENV);
        let password = lookup(CAMPAY_PASSWORD_ENV);
        let (username, password) = match (username, password) {
            (None, None) => return Ok(None),
            (Some(_), None) => return Err(ConfigError::Missing(CAMPAY_PASSWORD_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(CAMPAY_USERNAME_ENV)),
            (Some(u), Some(p)) => (u, p),
        };

        let base_url = lookup(CAMPAY_BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url).map_err(|_| ConfigError::Invalid {
            name: CAMPAY_BASE_URL_ENV,
            value: base_url.clone(),
        })?;

        Ok(Some(Self {
            base_url,
            username,
            password,
            currency: currency_from(lookup)?,
        }))
    }
}

/// Everything the service needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub log_format: LogFormat,
    pub gateway: Option<GatewayConfig>,
    pub flow: FlowSettings,
    pub admin_token: Option<String>,
    pub status_poll_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_optional)
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let log_format = match lookup(LOG_FORMAT_ENV).map(|v| v.to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let redirect_url =
            lookup(DONATION_REDIRECT_URL_ENV).unwrap_or_else(|| DEFAULT_REDIRECT_URL.to_string());
        url::Url::parse(&redirect_url).map_err(|_| ConfigError::Invalid {
            name: DONATION_REDIRECT_URL_ENV,
            value: redirect_url.clone(),
        })?;

        let mode = match lookup(DONATION_COLLECTION_MODE_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: DONATION_COLLECTION_MODE_ENV,
                value: raw,
            })?,
            None => CollectionMode::PaymentLink,
        };

        let status_poll_interval = match lookup(STATUS_POLL_INTERVAL_ENV) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: STATUS_POLL_INTERVAL_ENV,
                        value: raw,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        };

        let defaults = ManualInstructions::default();
        let instructions = ManualInstructions {
            bank_name: lookup(MANUAL_BANK_NAME_ENV).unwrap_or(defaults.bank_name),
            bank_account: lookup(MANUAL_BANK_ACCOUNT_ENV).unwrap_or(defaults.bank_account),
            account_holder: lookup(MANUAL_BANK_HOLDER_ENV).unwrap_or(defaults.account_holder),
            mtn_mobile_money: lookup(MANUAL_MOBILE_MONEY_ENV).unwrap_or(defaults.mtn_mobile_money),
            orange_money: lookup(MANUAL_ORANGE_MONEY_ENV).unwrap_or(defaults.orange_money),
        };

        Ok(Self {
            host: lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            data_dir: PathBuf::from(
                lookup(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            ),
            log_format,
            gateway: GatewayConfig::from_lookup(&lookup)?,
            flow: FlowSettings {
                redirect_url,
                currency: currency_from(&lookup)?,
                mode,
                instructions,
            },
            admin_token: lookup(ADMIN_API_TOKEN_ENV),
            status_poll_interval,
        })
    }
}

fn currency_from(lookup: &impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    let currency = lookup(CAMPAY_CURRENCY_ENV)
        .map(|v| v.to_ascii_uppercase())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(currency)
    } else {
        Err(ConfigError::Invalid {
            name: CAMPAY_CURRENCY_ENV,
            value: currency,
        })
    }
}

/// Trimmed, non-empty environment value.
pub fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_any_variables() {
        let config = AppConfig::from_lookup(lookup_from(&[])).expect("defaults are valid");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.gateway.is_none());
        assert!(config.admin_token.is_none());
        assert_eq!(config.flow.currency, "XAF");
        assert_eq!(config.flow.mode, CollectionMode::PaymentLink);
        assert_eq!(config.status_poll_interval, Duration::from_secs(60));
    }

    #[test]
    fn gateway_requires_both_credentials() {
        let error = AppConfig::from_lookup(lookup_from(&[(CAMPAY_USERNAME_ENV, "church")]))
            .expect_err("half-configured gateway should fail");
        assert_eq!(error, ConfigError::Missing(CAMPAY_PASSWORD_ENV));
    }

    #[test]
    fn gateway_config_is_loaded() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (CAMPAY_USERNAME_ENV, "church"),
            (CAMPAY_PASSWORD_ENV, "secret"),
            (CAMPAY_CURRENCY_ENV, "xaf"),
            (DONATION_COLLECTION_MODE_ENV, "direct"),
            (LOG_FORMAT_ENV, "JSON"),
        ]))
        .expect("valid config");
        let gateway = config.gateway.expect("gateway configured");
        assert_eq!(gateway.base_url, "https://demo.campay.net/api");
        assert_eq!(gateway.currency, "XAF");
        assert_eq!(config.flow.mode, CollectionMode::DirectCollection);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&[(PORT_ENV, "eighty")])),
            Err(ConfigError::Invalid { name: PORT_ENV, .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&[(DONATION_REDIRECT_URL_ENV, "not a url")])),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&[(STATUS_POLL_INTERVAL_ENV, "0")])),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&[(CAMPAY_CURRENCY_ENV, "FCFA")])),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn manual_instructions_can_be_overridden() {
        let config = AppConfig::from_lookup(lookup_from(&[(
            MANUAL_ORANGE_MONEY_ENV,
            "699 00 00 00",
        )]))
        .expect("valid config");
        assert_eq!(config.flow.instructions.orange_money, "699 00 00 00");
        assert_eq!(
            config.flow.instructions.bank_name,
            ManualInstructions::default().bank_name
        );
    }
}
