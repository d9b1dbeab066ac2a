// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP + WebSocket transport for the relay.

pub mod http;
pub mod ws;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::RelayState;

/// Build the axum `Router` with all relay routes.
///
/// Anything that is not an API or WebSocket route is served from the
/// configured front-end directory.
pub fn build_router(state: Arc<RelayState>) -> Router {
    let assets = ServeDir::new(&state.config.public_dir);
    Router::new()
        .route("/api/v1/health", get(http::health))
        .route("/ws", get(ws::ws_handler))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
