// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C6 — the `map<channel-name, ChannelWorker>` registry. Thin guarded
//! map; insertion only by the supervisor, removal only after the
//! worker process has exited or been terminated. No duplicate names.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::{ChannelWorker, EngineError};

type Workers = HashMap<String, Arc<ChannelWorker>>;

#[derive(Default)]
pub struct ChannelRegistry {
    workers: Mutex<Workers>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly started channel worker. Rejects a name collision
    /// rather than silently replacing an existing worker.
    pub fn insert(&self, worker: Arc<ChannelWorker>) -> Result<(), EngineError> {
        let mut workers = self.workers.lock();
        if workers.contains_key(worker.name()) {
            return Err(EngineError::ChannelAlreadyExists(worker.name().to_string()));
        }
        workers.insert(worker.name().to_string(), worker);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.workers.lock().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<ChannelWorker>> {
        self.workers.lock().get(name).cloned()
    }

    /// Remove and return `name`'s worker. The caller is expected to have
    /// already stopped its process (`stop_worker`) before calling this.
    pub fn remove(&self, name: &str) -> Option<Arc<ChannelWorker>> {
        self.workers.lock().remove(name)
    }

    /// Read-only snapshot for status/telemetry, taken without holding
    /// the lock across the caller's use of it.
    pub fn unguarded_access(&self) -> Vec<Arc<ChannelWorker>> {
        self.workers.lock().values().cloned().collect()
    }

    /// A scoped exclusive view for callers that need to iterate and
    /// mutate under the lock.
    pub fn access(&self) -> MutexGuard<'_, Workers> {
        self.workers.lock()
    }

    pub fn len(&self) -> usize {
        self.workers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "channel_registry_tests.rs"]
mod tests;
