// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread-safe state holder with a wait-while-equals primitive (C1).

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::ChannelState;

/// Holds a single [`ChannelState`], safe to read and write from any
/// context, with a blocking wait for "state has changed away from X".
///
/// All operations are safe to call concurrently. `wait_while` accepts a
/// `None` timeout meaning "wait indefinitely"; a zero timeout returns
/// immediately without blocking.
pub struct StateCell {
    state: Mutex<ChannelState>,
    changed: Condvar,
}

impl StateCell {
    /// Create a new cell in the given initial state.
    pub fn new(initial: ChannelState) -> Self {
        Self { state: Mutex::new(initial), changed: Condvar::new() }
    }

    /// Atomic read of the current state.
    pub fn get(&self) -> ChannelState {
        *self.state.lock()
    }

    /// Atomic write of a new state; wakes all waiters.
    pub fn set(&self, new: ChannelState) {
        let mut guard = self.state.lock();
        *guard = new;
        self.changed.notify_all();
    }

    /// Convenience predicate: is the current state "probably running"?
    pub fn probably_running(&self) -> bool {
        self.get().probably_running()
    }

    /// Block until `get() != s` or `timeout` elapses.
    ///
    /// Returns `true` if the wait ended because the state changed, `false`
    /// if it ended because of timeout. `None` waits indefinitely. A zero
    /// or already-elapsed timeout returns immediately.
    pub fn wait_while(&self, s: ChannelState, timeout: Option<Duration>) -> bool {
        let mut guard = self.state.lock();
        if *guard != s {
            return true;
        }

        match timeout {
            None => {
                while *guard == s {
                    self.changed.wait(&mut guard);
                }
                true
            }
            Some(d) if d.is_zero() => false,
            Some(d) => {
                let deadline = Instant::now() + d;
                while *guard == s {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return false;
                    }
                    let result = self.changed.wait_for(&mut guard, remaining);
                    if result.timed_out() && *guard == s {
                        return false;
                    }
                }
                true
            }
        }
    }
}

#[cfg(test)]
#[path = "state_cell_tests.rs"]
mod tests;
