// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::builder::TypedValueParser;

use crate::history::DEFAULT_HISTORY_CAPACITY;

/// Bundled front-end, resolved next to the crate sources.
pub const DEFAULT_PUBLIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/public");

/// Configuration for the chat relay server.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "chatrelay", version, about = "Real-time chat broadcast relay")]
pub struct RelayConfig {
    /// Host to bind on.
    #[arg(long, default_value = "0.0.0.0", env = "CHATRELAY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 3000, env = "PORT")]
    pub port: u16,

    /// Directory of front-end files served at `/`.
    #[arg(long, default_value = DEFAULT_PUBLIC_DIR, env = "CHATRELAY_PUBLIC_DIR")]
    pub public_dir: PathBuf,

    /// Number of recent messages replayed to new clients.
    #[arg(
        long,
        default_value_t = DEFAULT_HISTORY_CAPACITY,
        env = "CHATRELAY_HISTORY_CAPACITY",
        value_parser = clap::value_parser!(u32).range(1..).map(|n| n as usize),
    )]
    pub history_capacity: usize,

    /// Log format (json or text).
    #[arg(long, env = "CHATRELAY_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "CHATRELAY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl RelayConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
