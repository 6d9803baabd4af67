// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process shutdown wiring.

use std::{fmt::Display, future::Future};

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancel `token` once `signal` fires. A signal listener that failed to
/// install is logged and leaves the token alone, so the server keeps running.
pub async fn cancel_on<E: Display>(
    signal: impl Future<Output = Result<(), E>>,
    token: CancellationToken,
) {
    match signal.await {
        Ok(()) => {
            info!("shutdown signal received");
            token.cancel();
        }
        Err(e) => error!(error = %e, "cannot listen for shutdown signal"),
    }
}

/// [`cancel_on`] for Ctrl-C.
pub async fn cancel_on_ctrl_c(token: CancellationToken) {
    cancel_on(tokio::signal::ctrl_c(), token).await;
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[tokio::test]
    async fn fired_signal_cancels() {
        let token = CancellationToken::new();
        cancel_on(async { Ok::<(), io::Error>(()) }, token.clone()).await;
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn failed_listener_keeps_running() {
        let token = CancellationToken::new();
        cancel_on(
            async { Err::<(), _>(io::Error::other("no signal driver")) },
            token.clone(),
        )
        .await;
        assert!(!token.is_cancelled());
    }
}
