// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use crate::StopState;

/// Response from the supervisor to an RPC client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Bare success, no payload (`stop`, `start_channels`, `reaper_start`, ...).
    Ok,

    /// Liveness reply to `ping`.
    Pong,

    /// Free-form human-readable text: rendered config dumps, status
    /// text, table renders, log-level names, confirmations.
    Text { body: String },

    /// Outcome of a channel stop/kill/remove.
    StopResult { state: StopState, message: String },

    /// The call failed; `message` is suitable for display to an operator.
    Error { message: String },
}

impl Response {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text { body: body.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }

    /// Whether this response represents a successful outcome.
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
