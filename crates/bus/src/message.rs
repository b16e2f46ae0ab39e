// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire payload carried over the bus.

use serde::{Deserialize, Serialize};

/// An opaque payload published under a routing key. The engine does not
/// interpret the bytes; a module's `step` function is responsible for
/// encoding/decoding its own data blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub routing_key: String,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn new(routing_key: impl Into<String>, payload: Vec<u8>) -> Self {
        Self { routing_key: routing_key.into(), payload }
    }
}
