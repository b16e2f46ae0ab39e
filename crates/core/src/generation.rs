// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monotonic generation counter distinguishing successive incarnations
//! of the same channel or source across restarts.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Opaque, monotonically increasing identifier for one incarnation of a
/// worker. Two workers with the same [`crate::SourceIdentity`] but
/// different generations are the "same source, different run" — a
/// restart bumps the generation rather than minting a new identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GenerationId(u64);

impl GenerationId {
    /// The generation assigned to a worker's first incarnation.
    pub const FIRST: Self = Self(1);

    /// Reconstruct a generation id from its raw counter value, e.g. one
    /// carried over the wire in a source announcement.
    pub fn nth(value: u64) -> Self {
        Self(value)
    }

    /// The generation that comes after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The raw counter value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process-wide source of fresh [`GenerationId`]s, handed out in order.
#[derive(Debug, Default)]
pub struct GenerationSequence(AtomicU64);

impl GenerationSequence {
    /// A sequence whose first `next()` call returns [`GenerationId::FIRST`].
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Allocate the next generation id.
    pub fn next(&self) -> GenerationId {
        GenerationId(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[cfg(test)]
#[path = "generation_tests.rs"]
mod tests;
