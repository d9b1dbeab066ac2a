// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::state::RelayState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub clients: usize,
    pub history: usize,
}

/// `GET /api/v1/health`
pub async fn health(State(state): State<Arc<RelayState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "running".to_owned(),
        clients: state.relay.client_count(),
        history: state.relay.history_len(),
    })
}
