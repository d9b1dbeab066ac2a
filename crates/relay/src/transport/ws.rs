// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client WebSocket handler.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::error::RelayError;
use crate::registry::Connection;
use crate::state::RelayState;

/// Longest slice of a rejected frame echoed into the logs.
const PREVIEW_CHARS: usize = 120;

/// `GET /ws` — WebSocket upgrade for a chat client.
pub async fn ws_handler(
    State(state): State<Arc<RelayState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Per-connection event loop.
async fn handle_ws(socket: WebSocket, state: Arc<RelayState>) {
    let (conn, mut outbound) = Connection::open();
    let (mut ws_tx, mut ws_rx) = socket.split();

    let replayed = state.relay.on_connect(&conn);
    info!(conn = %conn.id(), clients = state.relay.client_count(), replayed, "client connected");

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => break,

            // Forward queued broadcasts and replay to the client.
            frame = outbound.recv() => {
                match frame {
                    Some(text) => {
                        if ws_tx.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // Handle frames from the client.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => relay_frame(&state, &conn, text.as_str()),
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => relay_frame(&state, &conn, text),
                        Err(_) => {
                            discard(&conn, RelayError::InvalidUtf8, &String::from_utf8_lossy(&bytes))
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(conn = %conn.id(), err = %e, "websocket read failed");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    state.relay.on_disconnect(conn.id());
    drop(outbound);
    let _ = ws_tx.close().await;
    info!(conn = %conn.id(), clients = state.relay.client_count(), "client disconnected");
}

fn relay_frame(state: &RelayState, conn: &Connection, text: &str) {
    match state.relay.on_message(conn, text) {
        Ok(fanout) => {
            debug!(conn = %conn.id(), delivered = fanout.delivered, pruned = fanout.pruned, "relayed");
        }
        Err(e) => discard(conn, e, text),
    }
}

fn discard(conn: &Connection, reason: RelayError, text: &str) {
    warn!(conn = %conn.id(), reason = %reason, preview = %preview(text), "invalid message received");
}

/// First [`PREVIEW_CHARS`] characters of `text`, cut on a char boundary.
pub fn preview(text: &str) -> &str {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
