// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, sync::Arc};

use church_giving_server::{
    api::router,
    auth::AdminToken,
    config::{AppConfig, LogFormat},
    donation::DonationService,
    providers::{CampayClient, PaymentGateway},
    shutdown::cancel_on_ctrl_c,
    state::AppState,
    status_poller::StatusPoller,
    storage::{
        ContactNoteRepository, DonationRepository, DonationStore, JsonStorage, StatusCache,
        StoragePaths,
    },
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Pretty);
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    let mut storage = JsonStorage::new(StoragePaths::new(&config.data_dir));
    if let Err(e) = storage.initialize() {
        error!(error = %e, data_dir = %config.data_dir.display(), "cannot initialize data directory");
        return ExitCode::FAILURE;
    }
    info!(data_dir = %config.data_dir.display(), "record store ready");

    let store: Arc<dyn DonationStore> = Arc::new(DonationRepository::new(storage.clone()));
    let notes = Arc::new(ContactNoteRepository::new(storage.clone()));
    let status_cache = Arc::new(StatusCache::default());

    let campay = match &config.gateway {
        Some(gateway) => match CampayClient::new(gateway) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                error!(error = %e, "cannot build payment gateway client");
                return ExitCode::FAILURE;
            }
        },
        None => {
            warn!("payment gateway not configured; donations will receive manual instructions");
            None
        }
    };

    let mut donations =
        DonationService::new(store.clone(), config.flow.clone()).with_notes(notes);
    if let Some(client) = &campay {
        donations = donations.with_gateway(client.clone() as Arc<dyn PaymentGateway>);
    }

    let admin_token = config.admin_token.as_deref().and_then(AdminToken::new);
    if admin_token.is_none() {
        warn!("admin token not set; back-office endpoints are disabled");
    }

    let mut state = AppState::new(donations)
        .with_admin_token(admin_token)
        .with_storage(Arc::new(storage))
        .with_status_cache(status_cache.clone());
    if let Some(client) = &campay {
        state = state.with_campay(client.clone());
    }

    let shutdown = CancellationToken::new();
    let poller = campay.as_ref().map(|client| {
        let poller = StatusPoller::new(client.clone() as Arc<dyn PaymentGateway>, store.clone())
            .with_interval(config.status_poll_interval)
            .with_cache(status_cache.clone());
        tokio::spawn(poller.run(shutdown.clone()))
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "cannot bind listener");
            return ExitCode::FAILURE;
        }
    };
    info!(%addr, "church giving server listening (docs at /docs)");

    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    let serve_shutdown = shutdown.clone();
    let result = axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { serve_shutdown.cancelled().await })
        .await;

    shutdown.cancel();
    if let Some(handle) = poller {
        let _ = handle.await;
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}
