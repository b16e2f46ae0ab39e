// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C3 — the per-source-identity worker process handle.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use de_bus::{queue_name, routing_key};
use de_core::{ChannelState, Product, SourceIdentity, StateCell};
use parking_lot::Mutex as SyncMutex;
use tokio::sync::Mutex as AsyncMutex;

use crate::{EngineError, WorkerProcess};

/// Owns one source feed's OS process, shared by every channel that
/// references the same [`SourceIdentity`]. `channel_refcount` is
/// mutated only under the source registry's lock; the process runs iff
/// the refcount is non-empty and `state` is probably-running.
pub struct SourceWorker {
    identity: SourceIdentity,
    routing_key: String,
    queue_name: String,
    produces: BTreeSet<Product>,
    state: Arc<StateCell>,
    channel_refcount: SyncMutex<HashSet<String>>,
    process: AsyncMutex<Option<WorkerProcess>>,
}

impl SourceWorker {
    /// Construct a not-yet-started worker for `identity`, with its
    /// routing key and queue name derived deterministically from it.
    pub fn new(identity: SourceIdentity, produces: BTreeSet<Product>) -> Self {
        let routing_key = routing_key(&identity);
        let queue_name = queue_name(&identity);
        Self {
            identity,
            routing_key,
            queue_name,
            produces,
            state: Arc::new(StateCell::new(ChannelState::Boot)),
            channel_refcount: SyncMutex::new(HashSet::new()),
            process: AsyncMutex::new(None),
        }
    }

    pub fn identity(&self) -> &SourceIdentity {
        &self.identity
    }

    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    pub fn produces(&self) -> &BTreeSet<Product> {
        &self.produces
    }

    pub fn state(&self) -> Arc<StateCell> {
        Arc::clone(&self.state)
    }

    /// Add `channel` to the set of channels referencing this source.
    pub fn attach_channel(&self, channel: &str) {
        self.channel_refcount.lock().insert(channel.to_string());
    }

    /// Remove `channel` from the refcount set; returns whether the
    /// refcount is now empty (the source has no more referents).
    pub fn detach_channel(&self, channel: &str) -> bool {
        let mut refs = self.channel_refcount.lock();
        refs.remove(channel);
        refs.is_empty()
    }

    pub fn refcount(&self) -> usize {
        self.channel_refcount.lock().len()
    }

    /// Spawn the worker process that instantiates the module and begins
    /// its produce/persist/publish loop.
    pub async fn start(&self, program: &str, args: &[String]) -> Result<(), EngineError> {
        let proc = WorkerProcess::spawn(program, args).map_err(EngineError::Process)?;
        *self.process.lock().await = Some(proc);
        self.state.set(ChannelState::Active);
        Ok(())
    }

    pub async fn is_alive(&self) -> bool {
        match self.process.lock().await.as_mut() {
            Some(p) => p.is_alive(),
            None => false,
        }
    }

    pub async fn exitcode(&self) -> Option<i32> {
        self.process.lock().await.as_mut().and_then(|p| p.exitcode())
    }

    /// Cooperative stop: move to `OFFLINE`, signal the worker process to
    /// do the same across the process boundary, join with a grace
    /// window, and terminate any survivor. Mirrors the source registry's
    /// `detach_channel` contract (C4).
    pub async fn stop(&self, grace: Option<Duration>) -> Result<(), EngineError> {
        self.state.set(ChannelState::Offline);
        let mut guard = self.process.lock().await;
        let Some(proc) = guard.as_mut() else {
            return Ok(());
        };
        proc.request_offline().map_err(EngineError::Process)?;
        if proc.join(grace).await.is_none() {
            proc.terminate().map_err(EngineError::Process)?;
        }
        self.state.set(ChannelState::Shutdown);
        Ok(())
    }

    pub async fn terminate(&self) -> Result<(), EngineError> {
        if let Some(proc) = self.process.lock().await.as_mut() {
            proc.terminate().map_err(EngineError::Process)?;
        }
        self.state.set(ChannelState::Shutdown);
        Ok(())
    }
}

#[cfg(test)]
#[path = "source_worker_tests.rs"]
mod tests;
