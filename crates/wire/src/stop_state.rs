// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outcome of an attempt to stop a channel worker.

use de_core::simple_display;
use serde::{Deserialize, Serialize};

/// How a `stop_channel` / `kill_channel` / `rm_channel` call resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopState {
    /// No channel with that name was registered.
    NotFound,
    /// The worker exited on its own within the timeout.
    Clean,
    /// The worker did not exit in time and was force-killed.
    Terminated,
}

simple_display! {
    StopState {
        NotFound => "not found",
        Clean => "stopped cleanly",
        Terminated => "terminated",
    }
}

#[cfg(test)]
#[path = "stop_state_tests.rs"]
mod tests;
