// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `Bus` for tests. Gated behind the `test-support` feature,
//! following the same `Fake*` adapter convention used elsewhere in this
//! workspace.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::{Bus, BusError, Message};

/// An in-process `Bus` backed by a `tokio::sync::mpsc` channel per queue
/// name. `publish` fans out to every subscriber currently registered
/// for that queue; late subscribers do not see earlier messages.
#[derive(Clone, Default)]
pub struct FakeBus {
    queues: Arc<Mutex<HashMap<String, Vec<mpsc::Sender<Message>>>>>,
    flush_count: Arc<Mutex<u64>>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `flush_db` has been called; lets tests assert
    /// that shutdown actually flushed the broker.
    pub fn flush_count(&self) -> u64 {
        *self.flush_count.lock()
    }
}

#[async_trait]
impl Bus for FakeBus {
    async fn publish(&self, routing_key: &str, message: Message) -> Result<(), BusError> {
        let senders = self.queues.lock().get(routing_key).cloned().unwrap_or_default();
        for sender in senders {
            // A full or dropped subscriber never blocks or fails publish.
            let _ = sender.try_send(message.clone());
        }
        Ok(())
    }

    async fn subscribe(&self, queue_name: &str) -> Result<mpsc::Receiver<Message>, BusError> {
        let (tx, rx) = mpsc::channel(crate::SUBSCRIBE_CHANNEL_CAPACITY);
        self.queues.lock().entry(queue_name.to_string()).or_default().push(tx);
        Ok(rx)
    }

    async fn ping(&self) -> Result<(), BusError> {
        Ok(())
    }

    async fn flush_db(&self) -> Result<(), BusError> {
        *self.flush_count.lock() += 1;
        self.queues.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_bus_tests.rs"]
mod tests;
