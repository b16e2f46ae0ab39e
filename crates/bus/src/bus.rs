// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Bus` trait seam: everything a source or channel worker needs
//! from the message broker.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{BusError, Message};

/// Default channel capacity for a `subscribe` receiver before the
/// publisher side starts applying backpressure.
pub const SUBSCRIBE_CHANNEL_CAPACITY: usize = 256;

/// Abstraction over the message broker. Production code talks to
/// `RedisBus`; tests talk to `FakeBus`.
#[async_trait]
pub trait Bus: Send + Sync {
    /// Publish a message under `routing_key` on the shared exchange.
    async fn publish(&self, routing_key: &str, message: Message) -> Result<(), BusError>;

    /// Subscribe to the named queue, returning a receiver that yields
    /// every message routed to it.
    async fn subscribe(&self, queue_name: &str) -> Result<mpsc::Receiver<Message>, BusError>;

    /// Liveness check against the broker; required before the
    /// supervisor accepts any RPC.
    async fn ping(&self) -> Result<(), BusError>;

    /// Flush the broker's keyspace for the configured logical database,
    /// so stale queue state from a prior run does not poison this one.
    async fn flush_db(&self) -> Result<(), BusError>;
}
