// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Donation submission and health checks are public. Back-office routes
//! (listing donations, status changes, gateway utilities) require
//! `Authorization: Bearer <ADMIN_API_TOKEN>`.
//!
//! When `ADMIN_API_TOKEN` is unset, back-office routes answer 503 instead of
//! running unauthenticated.

pub mod error;
pub mod extractor;
pub mod token;

pub use error::AuthError;
pub use extractor::AdminAuth;
pub use token::AdminToken;
