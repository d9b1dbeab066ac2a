// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Reasons an inbound frame is dropped instead of relayed.
///
/// None of these are ever reported to clients; the transport logs them and
/// keeps the connection open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    /// Payload is not valid JSON.
    InvalidJson,
    /// Payload is valid JSON but not an object.
    NotAnObject,
    /// Binary frame that is not valid UTF-8.
    InvalidUtf8,
    /// Message could not be serialized for fan-out.
    Encode,
}

impl RelayError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidJson => "INVALID_JSON",
            Self::NotAnObject => "NOT_AN_OBJECT",
            Self::InvalidUtf8 => "INVALID_UTF8",
            Self::Encode => "ENCODE",
        }
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for RelayError {}
