// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC Protocol for supervisor communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod format;
mod request;
mod response;
mod stop_state;
mod wire;

pub use format::{TableFormat, TableFrame};
pub use request::{ConfigTarget, Request};
pub use response::Response;
pub use stop_state::StopState;
pub use wire::{
    decode, encode, read_message, read_request, write_message, write_response, ProtocolError,
    MAX_FRAME_BYTES,
};