// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn display_strings_match_expected_messages() {
    assert_eq!(StopState::NotFound.to_string(), "not found");
    assert_eq!(StopState::Clean.to_string(), "stopped cleanly");
    assert_eq!(StopState::Terminated.to_string(), "terminated");
}

#[test]
fn serializes_as_snake_case() {
    let json = serde_json::to_string(&StopState::Terminated).unwrap();
    assert_eq!(json, "\"terminated\"");
}
