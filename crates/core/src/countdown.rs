// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A shared timeout budget that is spent down across a sequence of
//! blocking waits (C2).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A total duration budget that is consumed as a series of operations
/// each take their own slice of time.
///
/// `Countdown::new(None)` models "no timeout": every [`Countdown::scope`]
/// guard reports `remaining() == None` and never exhausts. Once a finite
/// countdown reaches zero it stays at zero; it is never "un-exhausted".
pub struct Countdown {
    remaining_millis: Option<AtomicU64>,
}

impl Countdown {
    /// Start a countdown with the given total budget. `None` means no
    /// timeout — waits block indefinitely and the budget never depletes.
    pub fn new(budget: Option<Duration>) -> Self {
        Self {
            remaining_millis: budget.map(|d| AtomicU64::new(millis_saturating(d))),
        }
    }

    /// Remaining budget, or `None` if this countdown has no timeout.
    pub fn remaining(&self) -> Option<Duration> {
        self.remaining_millis
            .as_ref()
            .map(|m| Duration::from_millis(m.load(Ordering::Acquire)))
    }

    /// Whether the budget has been fully spent. A no-timeout countdown is
    /// never exhausted.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.remaining(), Some(d) if d.is_zero())
    }

    /// Open an RAII scope that, on drop, subtracts the wall-clock time it
    /// was alive for from the remaining budget (saturating at zero).
    pub fn scope(&self) -> CountdownGuard<'_> {
        CountdownGuard { countdown: self, started: Instant::now() }
    }
}

/// Scope guard returned by [`Countdown::scope`]; charges elapsed wall
/// time against the countdown when dropped.
pub struct CountdownGuard<'a> {
    countdown: &'a Countdown,
    started: Instant,
}

impl Drop for CountdownGuard<'_> {
    fn drop(&mut self) {
        let Some(remaining) = self.countdown.remaining_millis.as_ref() else {
            return;
        };
        let elapsed = millis_saturating(self.started.elapsed());
        remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_sub(elapsed))
            })
            .ok();
    }
}

fn millis_saturating(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "countdown_tests.rs"]
mod tests;
