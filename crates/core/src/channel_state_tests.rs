// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn boot_active_steady_are_probably_running() {
    assert!(ChannelState::Boot.probably_running());
    assert!(ChannelState::Active.probably_running());
    assert!(ChannelState::Steady.probably_running());
}

#[test]
fn offline_and_shutdown_states_are_not_probably_running() {
    assert!(!ChannelState::Offline.probably_running());
    assert!(!ChannelState::ShuttingDown.probably_running());
    assert!(!ChannelState::Shutdown.probably_running());
    assert!(!ChannelState::Error.probably_running());
}

#[test]
fn shutdown_and_error_are_terminal() {
    assert!(ChannelState::Shutdown.is_terminal());
    assert!(ChannelState::Error.is_terminal());
    assert!(!ChannelState::Active.is_terminal());
}

#[test]
fn parse_round_trips_display() {
    for state in [
        ChannelState::Boot,
        ChannelState::Active,
        ChannelState::Steady,
        ChannelState::Offline,
        ChannelState::ShuttingDown,
        ChannelState::Shutdown,
        ChannelState::Error,
    ] {
        let name = state.to_string();
        assert_eq!(ChannelState::parse(&name), Some(state));
    }
}

#[test]
fn parse_rejects_unknown_state_name() {
    assert_eq!(ChannelState::parse("NOT_A_STATE"), None);
}
