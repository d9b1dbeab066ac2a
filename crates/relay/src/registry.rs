// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live connection set.

use std::collections::HashMap;
use std::fmt;

use axum::extract::ws::Utf8Bytes;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Unique identity of one client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Send half of a client connection.
///
/// Frames are pushed onto an unbounded queue drained by the connection's own
/// socket loop, so a send never waits on the peer. The connection counts as
/// open for as long as that loop holds the receiving end.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Utf8Bytes>,
}

impl Connection {
    /// Create a connection and the queue its socket loop drains.
    pub fn open() -> (Self, mpsc::UnboundedReceiver<Utf8Bytes>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id: ConnectionId::new(), tx }, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queue a frame. Returns `false` if the connection is gone.
    pub fn send(&self, payload: Utf8Bytes) -> bool {
        self.tx.send(payload).is_ok()
    }
}

/// Set of live connections, keyed by identity.
#[derive(Debug, Default)]
pub struct Registry {
    connections: HashMap<ConnectionId, Connection>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, conn: Connection) {
        self.connections.insert(conn.id(), conn);
    }

    /// Remove a connection. Unknown ids are ignored; returns whether
    /// anything was removed.
    pub fn deregister(&mut self, id: ConnectionId) -> bool {
        self.connections.remove(&id).is_some()
    }

    /// Point-in-time copy of the live set for fan-out.
    pub fn snapshot(&self) -> Vec<Connection> {
        self.connections.values().cloned().collect()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
