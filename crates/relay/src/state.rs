// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tokio_util::sync::CancellationToken;

use crate::config::RelayConfig;
use crate::relay::Relay;

/// Shared server state handed to every route.
pub struct RelayState {
    pub relay: Relay,
    pub config: RelayConfig,
    pub shutdown: CancellationToken,
}

impl RelayState {
    pub fn new(config: RelayConfig, shutdown: CancellationToken) -> Self {
        Self { relay: Relay::new(config.history_capacity), config, shutdown }
    }
}
