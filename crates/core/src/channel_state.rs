// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel lifecycle state.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a channel worker's task manager.
///
/// Initial state is [`ChannelState::Boot`]; terminal states are
/// [`ChannelState::Shutdown`] and [`ChannelState::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    Boot,
    Active,
    Steady,
    Offline,
    ShuttingDown,
    Shutdown,
    Error,
}

crate::simple_display! {
    ChannelState {
        Boot => "BOOT",
        Active => "ACTIVE",
        Steady => "STEADY",
        Offline => "OFFLINE",
        ShuttingDown => "SHUTTINGDOWN",
        Shutdown => "SHUTDOWN",
        Error => "ERROR",
    }
}

impl ChannelState {
    /// Whether the channel is in one of `{BOOT, ACTIVE, STEADY}` — the
    /// set of states in which the channel is "probably running".
    pub fn probably_running(self) -> bool {
        matches!(self, Self::Boot | Self::Active | Self::Steady)
    }

    /// Whether this state is terminal (`SHUTDOWN` or `ERROR`).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Shutdown | Self::Error)
    }

    /// Parse a channel state from its uppercase name, as accepted by the
    /// `block_while` RPC.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "BOOT" => Self::Boot,
            "ACTIVE" => Self::Active,
            "STEADY" => Self::Steady,
            "OFFLINE" => Self::Offline,
            "SHUTTINGDOWN" => Self::ShuttingDown,
            "SHUTDOWN" => Self::Shutdown,
            "ERROR" => Self::Error,
            _ => return None,
        })
    }
}

#[cfg(test)]
#[path = "channel_state_tests.rs"]
mod tests;
