// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Donation Status Poller
//!
//! Background task that reconciles `gateway_initiated` donations with the
//! gateway, so records reach `completed`/`failed` even when nobody asks.
//!
//! Every `poll_interval` (default 60 s) the poller lists the records still
//! waiting on the gateway and syncs each one. A failure on one record is
//! logged and does not stop the sweep.
//!
//! Shutdown goes through a `tokio_util::sync::CancellationToken`.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::donation::sync_record;
use crate::providers::PaymentGateway;
use crate::storage::{DonationStatus, DonationStore, StatusCache};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

pub struct StatusPoller {
    gateway: Arc<dyn PaymentGateway>,
    store: Arc<dyn DonationStore>,
    cache: Option<Arc<StatusCache>>,
    poll_interval: Duration,
}

/// Counts from one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub checked: usize,
    pub changed: usize,
    pub failed: usize,
}

impl StatusPoller {
    pub fn new(gateway: Arc<dyn PaymentGateway>, store: Arc<dyn DonationStore>) -> Self {
        Self {
            gateway,
            store,
            cache: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Cache entries for references whose record changed get dropped.
    pub fn with_cache(mut self, cache: Arc<StatusCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Run until the cancellation token fires.
    ///
    /// ```rust,ignore
    /// tokio::spawn(poller.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Donation status poller starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Donation status poller shutting down");
                return;
            }

            self.sweep().await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Donation status poller shutting down");
                    return;
                }
            }
        }
    }

    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let pending = match self.store.list_by_status(DonationStatus::GatewayInitiated) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Status poller: failed to list donations");
                return report;
            }
        };
        if pending.is_empty() {
            return report;
        }

        info!(count = pending.len(), "Status poller: syncing initiated donations");

        for record in &pending {
            report.checked += 1;
            match sync_record(self.gateway.as_ref(), self.store.as_ref(), &record.id).await {
                Ok(outcome) => {
                    if outcome.changed {
                        report.changed += 1;
                        if let Some(cache) = &self.cache {
                            cache.invalidate(&outcome.record.reference);
                        }
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        donation_id = %record.id,
                        reference = %record.reference,
                        error = %e,
                        "Status poller: failed to sync donation"
                    );
                }
            }
        }
        report
    }
}
