// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The body that runs inside a source worker's OS process: instantiate
//! the module, produce, persist, publish, sleep, repeat until asked to
//! go offline.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use de_bus::{Bus, Message};
use de_core::{ChannelState, GenerationSequence, Product, StateCell};
use de_dataspace::{DataBlock, DataSpace, TaskManagerId};
use de_modules::Module;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::EngineError;

/// Wire payload a source worker publishes alongside a fresh generation:
/// which task manager produced it, which generation, and which products
/// it carries. The channel worker decodes this to know what to fetch
/// from the data space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceAnnouncement {
    pub taskmanager_id: String,
    pub generation: u64,
    pub products: BTreeSet<Product>,
}

/// Drive one source's produce/persist/publish/sleep loop until the
/// owning registry writes `OFFLINE` into `state`. Runs inside the
/// source worker's own OS process.
pub async fn run_source_loop(
    taskmanager_id: TaskManagerId,
    period: Duration,
    module: Arc<dyn Module>,
    state: Arc<StateCell>,
    bus: Arc<dyn Bus>,
    dataspace: Arc<dyn DataSpace>,
    routing_key: String,
    generations: Arc<GenerationSequence>,
) -> Result<(), EngineError> {
    state.set(ChannelState::Active);

    loop {
        if state.get() == ChannelState::Offline {
            break;
        }

        let generation = generations.next();
        let seed = DataBlock::new(taskmanager_id.clone(), generation, 0);
        let produced = module.step(seed).await.map_err(|err| {
            warn!(%taskmanager_id, %err, "source module failed to produce");
            err
        });
        let Ok(block) = produced else {
            continue;
        };

        dataspace.put(block.clone()).await.map_err(EngineError::DataSpace)?;

        let announcement = SourceAnnouncement {
            taskmanager_id: taskmanager_id.to_string(),
            generation: generation.value(),
            products: block.products.keys().cloned().collect(),
        };
        let payload = serde_json::to_vec(&announcement).unwrap_or_default();
        bus.publish(&routing_key, Message::new(routing_key.clone(), payload))
            .await
            .map_err(EngineError::Bus)?;

        info!(%taskmanager_id, generation = generation.value(), "source produced a new generation");

        if !sleep_or_offline(period, &state).await {
            break;
        }
    }

    state.set(ChannelState::Shutdown);
    Ok(())
}

/// Sleep for `period`, waking early if the state cell flips to `OFFLINE`.
/// Returns `false` when the loop should stop.
async fn sleep_or_offline(period: Duration, state: &Arc<StateCell>) -> bool {
    let deadline = tokio::time::Instant::now() + period;
    loop {
        if state.get() == ChannelState::Offline {
            return false;
        }
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            return true;
        }
        tokio::time::sleep(remaining.min(Duration::from_millis(100))).await;
    }
}

#[cfg(test)]
#[path = "produce_tests.rs"]
mod tests;
