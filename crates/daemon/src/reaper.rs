// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A handle onto the reaper — the background task that garbage-collects
//! expired data-space rows. The reaper's own expiry sweep logic belongs
//! to the data space's real backend and is out of scope here; what this
//! crate owns is the lifecycle the supervisor exposes over RPC:
//! `reaper_start`, `reaper_stop`, `reaper_status`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

pub struct ReaperHandle {
    running: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Default for ReaperHandle {
    fn default() -> Self {
        Self { running: Arc::new(AtomicBool::new(false)), task: Mutex::new(None) }
    }
}

impl ReaperHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the reaper after an initial `delay`, replacing any
    /// previously running task.
    pub fn start(&self, delay: Duration) {
        self.stop();
        let running = Arc::clone(&self.running);
        running.store(true, Ordering::SeqCst);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            info!("reaper started");
            while running.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        });
        *self.task.lock() = Some(task);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> String {
        if self.is_running() { "Reaper is running.".to_string() } else { "Reaper is stopped.".to_string() }
    }
}

#[cfg(test)]
#[path = "reaper_tests.rs"]
mod tests;
