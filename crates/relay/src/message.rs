// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat message payloads.
//!
//! Messages are free-form JSON objects. Only `time` is interpreted by the
//! relay; every other key is carried through untouched and in its original
//! order.

use axum::extract::ws::Utf8Bytes;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RelayError;

/// Reserved key holding the ISO-8601 timestamp.
pub const TIME_KEY: &str = "time";

/// A single relayed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatMessage(Map<String, Value>);

impl ChatMessage {
    /// Parse a raw frame. Anything but a JSON object is rejected.
    pub fn parse(raw: &str) -> Result<Self, RelayError> {
        let value: Value = serde_json::from_str(raw).map_err(|_| RelayError::InvalidJson)?;
        serde_json::from_value(value).map_err(|_| RelayError::NotAnObject)
    }

    /// The `time` field, if it is a string.
    pub fn time(&self) -> Option<&str> {
        self.0.get(TIME_KEY).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Fill in `time` when the sender left it blank.
    ///
    /// Blank means absent, `null`, `false`, `0`, or `""`. Any other value is
    /// kept verbatim. Returns `true` when a timestamp was assigned.
    pub fn stamp_with(&mut self, now: impl FnOnce() -> String) -> bool {
        if self.0.get(TIME_KEY).is_some_and(|v| !is_blank(v)) {
            return false;
        }
        self.0.insert(TIME_KEY.to_owned(), Value::String(now()));
        true
    }

    /// [`stamp_with`](Self::stamp_with) using the current wall clock.
    pub fn stamp(&mut self) -> bool {
        self.stamp_with(timestamp_now)
    }

    /// Serialize to the text frame sent to every client.
    pub fn to_payload(&self) -> Result<Utf8Bytes, RelayError> {
        serde_json::to_string(self).map(Utf8Bytes::from).map_err(|_| RelayError::Encode)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Current UTC time as ISO-8601 with millisecond precision, e.g.
/// `2026-10-16T09:30:00.123Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
