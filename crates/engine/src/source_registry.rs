// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C4 — the `map<SourceIdentity, SourceWorker>` registry, deduplicating
//! source workers across channels by identity.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use de_core::{Countdown, ModuleClass, Product, SourceIdentity};
use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;
use tracing::{debug, info};

use crate::{EngineError, SourceWorker};

/// One source declaration inside a channel's config, as handed to
/// `SourceRegistry::update`.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// The key this source is referred to by within the channel.
    pub key: String,
    pub module_class: ModuleClass,
    pub config: Value,
    pub produces: BTreeSet<Product>,
}

type Workers = HashMap<SourceIdentity, Arc<SourceWorker>>;

/// Default grace window `detach_channel`/`prune` allow a source to exit
/// on its own before force-terminating it.
const DEFAULT_GRACE: Duration = Duration::from_secs(5);

pub struct SourceRegistry {
    workers: Mutex<Workers>,
    grace: Duration,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE)
    }
}

impl SourceRegistry {
    pub fn new(grace: Duration) -> Self {
        Self { workers: Mutex::new(HashMap::new()), grace }
    }

    /// Resolve (or create) a worker per entry in `configs`, attaching
    /// `channel` to each one's refcount. Returns the per-key mapping the
    /// caller needs to build the workflow graph. Never starts a worker
    /// — starting is the caller's responsibility once the channel is
    /// listening.
    pub fn update(
        &self,
        channel: &str,
        configs: Vec<SourceConfig>,
    ) -> Result<HashMap<String, Arc<SourceWorker>>, EngineError> {
        let mut workers = self.workers.lock();
        let mut result = HashMap::with_capacity(configs.len());
        for cfg in configs {
            let identity = SourceIdentity::new(cfg.module_class, cfg.config)?;
            let worker = workers
                .entry(identity.clone())
                .or_insert_with(|| Arc::new(SourceWorker::new(identity, cfg.produces)))
                .clone();
            worker.attach_channel(channel);
            result.insert(cfg.key, worker);
        }
        Ok(result)
    }

    async fn detach_with_level(&self, channel: &str, routing_keys: &[String], fine: bool) {
        let candidates: Vec<(SourceIdentity, Arc<SourceWorker>)> = {
            let workers = self.workers.lock();
            routing_keys
                .iter()
                .filter_map(|rk| {
                    workers
                        .iter()
                        .find(|(_, w)| w.routing_key() == rk)
                        .map(|(id, w)| (id.clone(), Arc::clone(w)))
                })
                .collect()
        };

        for (identity, worker) in candidates {
            let now_empty = worker.detach_channel(channel);
            if !now_empty {
                continue;
            }
            if worker.stop(Some(self.grace)).await.is_err() {
                continue;
            }
            self.workers.lock().remove(&identity);
            if fine {
                debug!(channel, routing_key = worker.routing_key(), "pruned source worker");
            } else {
                info!(channel, routing_key = worker.routing_key(), "detached source worker");
            }
        }
    }

    /// Release `channel`'s reference to each source named by
    /// `routing_keys`. Safe to call for a channel that was never
    /// attached, or repeatedly — a no-op in both cases.
    pub async fn detach_channel(&self, channel: &str, routing_keys: &[String]) {
        self.detach_with_level(channel, routing_keys, false).await;
    }

    /// Same effect as `detach_channel`, used from the `rm_channel` path;
    /// logs at a finer level.
    pub async fn prune(&self, channel: &str, routing_keys: &[String]) {
        self.detach_with_level(channel, routing_keys, true).await;
    }

    /// Move every source to OFFLINE, join under a shared timeout budget,
    /// terminate survivors, then clear the registry.
    pub async fn remove_all(&self, timeout: Option<Duration>) {
        let workers: Vec<Arc<SourceWorker>> = self.workers.lock().drain().map(|(_, w)| w).collect();
        let countdown = Countdown::new(timeout);
        for worker in workers {
            let remaining = countdown.remaining();
            let _scope = countdown.scope();
            worker.stop(remaining).await.ok();
        }
    }

    /// Read-only snapshot for status/telemetry, taken without holding
    /// the lock across the caller's use of it. Callers MUST NOT mutate.
    pub fn unguarded_access(&self) -> Vec<Arc<SourceWorker>> {
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
#[path = "source_registry_tests.rs"]
mod tests;
