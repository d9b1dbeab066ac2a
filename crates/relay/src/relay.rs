// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broadcast and history engine.
//!
//! One [`Relay`] is shared by every connection task. The registry and the
//! history live behind a single lock: a message is appended and fanned out
//! in one critical section, and a joiner is registered and replayed in
//! another. A joiner therefore sees each message exactly once, either in its
//! replay or as a live broadcast, and all clients observe history order.

use axum::extract::ws::Utf8Bytes;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::RelayError;
use crate::history::History;
use crate::message::ChatMessage;
use crate::registry::{Connection, ConnectionId, Registry};

/// Outcome of relaying one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fanout {
    /// Connections the payload was queued for.
    pub delivered: usize,
    /// Connections found closed and dropped from the registry.
    pub pruned: usize,
}

struct Inner {
    registry: Registry,
    history: History<Utf8Bytes>,
}

/// Shared relay state: live connections plus recent history.
pub struct Relay {
    inner: Mutex<Inner>,
}

impl Relay {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                registry: Registry::new(),
                history: History::new(history_capacity),
            }),
        }
    }

    /// Register a new connection and replay history to it.
    ///
    /// Returns the number of history entries queued. Replay stops quietly if
    /// the connection closes part way through.
    pub fn on_connect(&self, conn: &Connection) -> usize {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.registry.register(conn.clone());

        let mut replayed = 0;
        for payload in inner.history.iter() {
            if !conn.is_open() || !conn.send(payload.clone()) {
                break;
            }
            replayed += 1;
        }
        replayed
    }

    /// Validate, timestamp, record and broadcast one inbound frame.
    ///
    /// Malformed frames leave history and every connection untouched. The
    /// sender receives its own message like everyone else.
    pub fn on_message(&self, sender: &Connection, raw: &str) -> Result<Fanout, RelayError> {
        let mut msg = ChatMessage::parse(raw)?;
        msg.stamp();
        let payload = msg.to_payload()?;

        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.history.push(payload.clone());

        let mut fanout = Fanout::default();
        for conn in inner.registry.snapshot() {
            if conn.is_open() && conn.send(payload.clone()) {
                fanout.delivered += 1;
            } else {
                inner.registry.deregister(conn.id());
                fanout.pruned += 1;
                debug!(conn = %conn.id(), sender = %sender.id(), "pruned closed connection");
            }
        }
        Ok(fanout)
    }

    /// Drop a connection from the registry. Safe to call more than once.
    pub fn on_disconnect(&self, id: ConnectionId) -> bool {
        self.inner.lock().registry.deregister(id)
    }

    /// Serialized history, oldest first.
    pub fn history(&self) -> Vec<Utf8Bytes> {
        self.inner.lock().history.snapshot()
    }

    pub fn history_len(&self) -> usize {
        self.inner.lock().history.len()
    }

    pub fn client_count(&self) -> usize {
        self.inner.lock().registry.len()
    }

    pub fn is_registered(&self, id: ConnectionId) -> bool {
        self.inner.lock().registry.contains(id)
    }
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
