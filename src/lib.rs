// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Church Giving - Donation Payment Orchestration
//!
//! Accepts donation forms from the church website, opens a mobile-money
//! payment through the CamPay gateway and records every attempt locally.
//! When the gateway is unreachable the donor gets manual payment
//! instructions instead of an error.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Back-office bearer token
//! - `donation` - Form validation and the submission state machine
//! - `providers` - Payment gateway client (CamPay)
//! - `shutdown` - Signal handling for graceful shutdown
//! - `status_poller` - Background reconciliation of open donations
//! - `storage` - JSON record store under the data directory

pub mod api;
pub mod auth;
pub mod config;
pub mod donation;
pub mod error;
pub mod models;
pub mod phone;
pub mod providers;
pub mod shutdown;
pub mod state;
pub mod status_poller;
pub mod storage;
