// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chatrelay: real-time chat broadcast relay with bounded history replay.

pub mod config;
pub mod error;
pub mod history;
pub mod message;
pub mod registry;
pub mod relay;
pub mod state;
pub mod transport;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::RelayConfig;
use crate::state::RelayState;
use crate::transport::build_router;

/// Run the relay server until SIGINT/SIGTERM.
pub async fn run(config: RelayConfig) -> anyhow::Result<()> {
    let addr = config.addr();
    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    if !config.public_dir.is_dir() {
        warn!(public_dir = %config.public_dir.display(), "front-end directory not found; `/` will return 404");
    }

    let state = Arc::new(RelayState::new(config, shutdown));
    let listener = TcpListener::bind(&addr).await?;
    info!("chatrelay listening on http://{}", listener.local_addr()?);
    serve(listener, state).await
}

/// Serve the relay on an already-bound listener until `state.shutdown` fires.
pub async fn serve(listener: TcpListener, state: Arc<RelayState>) -> anyhow::Result<()> {
    let shutdown = state.shutdown.clone();
    let router = build_router(state);
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;
    Ok(())
}

/// Initialize tracing/logging from config.
///
/// Uses `try_init` so it's safe to call multiple times (e.g. from tests).
pub fn init_tracing(config: &RelayConfig) {
    use tracing_subscriber::fmt;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        let mut sigint =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).ok();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGTERM");
            }
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGINT");
            }
        }
        shutdown.cancel();
    });
}
