// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::AdminToken;
use crate::donation::{DonationService, FlowSettings};
use crate::providers::CampayClient;
use crate::storage::{DonationStore, InMemoryDonationStore, JsonStorage, StatusCache};

#[derive(Clone)]
pub struct AppState {
    /// Donation flow collaborators; each request runs its own state machine.
    pub donations: DonationService,
    /// Concrete gateway client for admin utilities (balance, history, ...).
    pub campay: Option<Arc<CampayClient>>,
    pub status_cache: Arc<StatusCache>,
    pub admin_token: Option<AdminToken>,
    /// File storage probed by the readiness check, when persistence is on disk.
    pub storage: Option<Arc<JsonStorage>>,
}

impl AppState {
    pub fn new(donations: DonationService) -> Self {
        Self {
            donations,
            campay: None,
            status_cache: Arc::new(StatusCache::default()),
            admin_token: None,
            storage: None,
        }
    }

    pub fn with_campay(mut self, campay: Arc<CampayClient>) -> Self {
        self.campay = Some(campay);
        self
    }

    pub fn with_admin_token(mut self, token: Option<AdminToken>) -> Self {
        self.admin_token = token;
        self
    }

    pub fn with_storage(mut self, storage: Arc<JsonStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_status_cache(mut self, cache: Arc<StatusCache>) -> Self {
        self.status_cache = cache;
        self
    }

    pub fn store(&self) -> &Arc<dyn DonationStore> {
        self.donations.store()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DonationService::new(
            Arc::new(InMemoryDonationStore::new()),
            FlowSettings::default(),
        ))
    }
}
