// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C5 — the channel worker handle. A channel worker owns a separate OS
//! process running the task manager; this type is the supervisor-side
//! handle onto it, mirroring `SourceWorker` (C3) but additionally
//! carrying the channel's declared `routing_keys` and its `produces`/
//! `consumes` maps for introspection RPCs.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use de_core::{ChannelState, Product, StateCell};
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::level_filters::LevelFilter;

use crate::{EngineError, WorkerProcess};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub struct ChannelWorker {
    name: String,
    id: u64,
    state: Arc<StateCell>,
    routing_keys: Vec<String>,
    produces: BTreeMap<String, BTreeSet<Product>>,
    consumes: BTreeMap<String, BTreeSet<Product>>,
    log_level: Mutex<LevelFilter>,
    process: AsyncMutex<Option<WorkerProcess>>,
}

impl ChannelWorker {
    pub fn new(
        name: impl Into<String>,
        routing_keys: Vec<String>,
        produces: BTreeMap<String, BTreeSet<Product>>,
        consumes: BTreeMap<String, BTreeSet<Product>>,
    ) -> Self {
        Self {
            name: name.into(),
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            state: Arc::new(StateCell::new(ChannelState::Boot)),
            routing_keys,
            produces,
            consumes,
            log_level: Mutex::new(LevelFilter::INFO),
            process: AsyncMutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn routing_keys(&self) -> &[String] {
        &self.routing_keys
    }

    pub fn produces(&self) -> &BTreeMap<String, BTreeSet<Product>> {
        &self.produces
    }

    pub fn consumes(&self) -> &BTreeMap<String, BTreeSet<Product>> {
        &self.consumes
    }

    pub fn state(&self) -> Arc<StateCell> {
        Arc::clone(&self.state)
    }

    pub fn get_loglevel(&self) -> LevelFilter {
        *self.log_level.lock()
    }

    pub fn set_loglevel_value(&self, level: LevelFilter) {
        *self.log_level.lock() = level;
    }

    /// Spawn the task manager process.
    pub async fn start(&self, program: &str, args: &[String]) -> Result<(), EngineError> {
        let child = WorkerProcess::spawn(program, args)?;
        *self.process.lock().await = Some(child);
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

    /// Cooperative shutdown request: flips this handle's own state cell
    /// (what status/introspection RPCs observe locally) and signals the
    /// worker process with SIGUSR1, which its task manager's signal
    /// handler maps onto writing `OFFLINE` into its own, process-local
    /// state cell — beginning its `ACTIVE/STEADY -> OFFLINE ->
    /// SHUTTINGDOWN` descent. The two state cells live in separate
    /// processes and are never the same memory; the signal is the only
    /// bridge between them.
    pub async fn take_offline(&self) {
        self.state.set(ChannelState::Offline);
        if let Some(p) = self.process.lock().await.as_mut() {
            if let Err(err) = p.request_offline() {
                tracing::warn!(channel = %self.name, %err, "failed to signal channel worker offline");
            }
        }
    }

    pub async fn join(&self, timeout: Option<Duration>) -> Option<i32> {
        match self.process.lock().await.as_mut() {
            Some(p) => p.join(timeout).await,
            None => None,
        }
    }

    pub async fn terminate(&self) -> Result<(), EngineError> {
        if let Some(p) = self.process.lock().await.as_mut() {
            p.terminate()?;
        }
        self.state.set(ChannelState::Shutdown);
        Ok(())
    }
}

#[cfg(test)]
#[path = "channel_worker_tests.rs"]
mod tests;
