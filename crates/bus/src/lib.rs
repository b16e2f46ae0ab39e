// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! de-bus: the shared topic exchange abstraction, broker URL
//! validation, and deterministic routing-key/queue-name derivation from
//! a source identity.

mod broker_url;
mod bus;
mod exchange;
mod message;
mod redis_bus;
mod routing;

#[cfg(any(test, feature = "test-support"))]
mod fake_bus;

pub use broker_url::{BrokerUrl, BusError};
pub use bus::{Bus, SUBSCRIBE_CHANNEL_CAPACITY};
pub use exchange::Exchange;
pub use message::Message;
pub use redis_bus::RedisBus;
pub use routing::{queue_name, routing_key};

#[cfg(any(test, feature = "test-support"))]
pub use fake_bus::FakeBus;
