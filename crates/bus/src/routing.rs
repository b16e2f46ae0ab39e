// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic routing-key / queue-name derivation from a source
//! identity.

use de_core::SourceIdentity;
use sha2::{Digest, Sha256};

const TOKEN_LEN: usize = 16;

fn identity_token(identity: &SourceIdentity) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity.module_class().as_str().as_bytes());
    hasher.update(b"\0");
    hasher.update(identity.canonical_json().as_bytes());
    let digest = hasher.finalize();
    let hex = hex_encode(&digest);
    hex[..TOKEN_LEN].to_string()
}

// Writing to a String never fails.
#[allow(clippy::expect_used)]
fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(out, "{b:02x}").expect("writing to a String never fails");
    }
    out
}

/// The routing key a source worker publishes under and that a channel's
/// consumers subscribe to for that source's products.
pub fn routing_key(identity: &SourceIdentity) -> String {
    format!("source.{}", identity_token(identity))
}

/// The durable queue name bound to `routing_key(identity)` on the shared
/// exchange.
pub fn queue_name(identity: &SourceIdentity) -> String {
    format!("source_queue.{}", identity_token(identity))
}

#[cfg(test)]
#[path = "routing_tests.rs"]
mod tests;
