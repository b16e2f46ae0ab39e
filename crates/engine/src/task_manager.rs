// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The body that runs inside a channel worker's OS process (C5): the
//! task manager. Subscribes to the channel's declared source queues and,
//! on each incoming generation announcement, advances the workflow one
//! step — transforms, then logic, then publishers, in the order the
//! validator (C8) computed — and writes the resulting generation back.

use std::collections::HashMap;
use std::sync::Arc;

use de_bus::Bus;
use de_core::{ChannelState, GenerationId, StateCell};
use de_dataspace::{DataBlock, DataSpace, TaskManagerId};
use de_modules::{Module, ModuleDeclaration};
use futures_util::stream::{FuturesUnordered, StreamExt};
use tracing::{error, info, warn};

use crate::produce::SourceAnnouncement;
use crate::{EngineError, WorkflowPlan};

/// Everything the task manager needs to drive one channel's workflow:
/// the ordered execution plan, the modules it names, and the source
/// queues to subscribe to.
pub struct TaskManagerConfig {
    pub channel: String,
    pub plan: WorkflowPlan,
    pub modules: Vec<ModuleDeclaration>,
    /// `(queue_name, routing_key)` for each source this channel consumes.
    pub queue_info: Vec<(String, String)>,
}

/// Run the task manager loop until the state cell is driven to
/// `OFFLINE` by the owning channel worker. Leaves `ACTIVE` for `STEADY`
/// once the initial subscriptions are in place, the signal
/// `start_channel_impl` waits on before declaring bringup complete.
pub async fn run_task_manager(
    cfg: TaskManagerConfig,
    state: Arc<StateCell>,
    bus: Arc<dyn Bus>,
    dataspace: Arc<dyn DataSpace>,
    modules_by_name: HashMap<String, Arc<dyn Module>>,
) -> Result<(), EngineError> {
    let mut subscriptions = FuturesUnordered::new();
    for (queue_name, _routing_key) in &cfg.queue_info {
        let mut rx = bus.subscribe(queue_name).await.map_err(EngineError::Bus)?;
        subscriptions.push(Box::pin(async move {
            let msg = rx.recv().await;
            (rx, msg)
        }));
    }

    state.set(ChannelState::Steady);
    info!(channel = %cfg.channel, "task manager entered STEADY");

    // `subscriptions.next()` can block indefinitely between source
    // messages, which would otherwise swallow a cooperative offline
    // request delivered (via SIGUSR1, across the process boundary)
    // while idle. Race it against a short poll of the state cell so the
    // loop still notices `OFFLINE` on its next boundary rather than only
    // on its next message.
    const OFFLINE_POLL: std::time::Duration = std::time::Duration::from_millis(100);

    loop {
        if state.get() == ChannelState::Offline {
            break;
        }
        let next = tokio::select! {
            item = subscriptions.next() => item,
            _ = tokio::time::sleep(OFFLINE_POLL) => continue,
        };
        let Some((mut rx, msg)) = next else {
            break;
        };
        let Some(msg) = msg else {
            // That queue's sender dropped; do not resubscribe to it.
            continue;
        };
        subscriptions.push(Box::pin(async move {
            let next = rx.recv().await;
            (rx, next)
        }));

        let announcement: SourceAnnouncement = match serde_json::from_slice(&msg.payload) {
            Ok(a) => a,
            Err(err) => {
                warn!(channel = %cfg.channel, %err, "dropping malformed source announcement");
                continue;
            }
        };

        match advance_generation(&cfg, &dataspace, &modules_by_name, &announcement).await {
            Ok(()) => {}
            Err(err) => {
                error!(channel = %cfg.channel, %err, "module fault; channel entering ERROR");
                state.set(ChannelState::Error);
                return Err(err);
            }
        }
    }

    state.set(ChannelState::ShuttingDown);
    state.set(ChannelState::Shutdown);
    Ok(())
}

/// Read the announced source generation, run every module in
/// topological order against a working block seeded from it, and
/// persist the result as the channel's next generation. Per I4, the
/// channel's own generation sequence is derived from its own latest
/// write, never from the source's generation numbering.
async fn advance_generation(
    cfg: &TaskManagerConfig,
    dataspace: &Arc<dyn DataSpace>,
    modules_by_name: &HashMap<String, Arc<dyn Module>>,
    announcement: &SourceAnnouncement,
) -> Result<(), EngineError> {
    let source_id = TaskManagerId::new(announcement.taskmanager_id.clone());
    let source_generation = GenerationId::nth(announcement.generation);
    let channel_id = TaskManagerId::new(cfg.channel.clone());

    let seed = dataspace.get(&source_id, source_generation).await.map_err(EngineError::DataSpace)?;

    let latest = dataspace.latest(&channel_id).await.map_err(EngineError::DataSpace)?;
    let next_generation = latest.as_ref().map(|b| b.generation.next()).unwrap_or(GenerationId::FIRST);

    let mut working = DataBlock::new(channel_id.clone(), next_generation, 0);
    if let Some(prior) = latest {
        working.products = prior.products;
    }
    if let Some(seed) = seed {
        working.products.extend(seed.products);
    }

    for name in &cfg.plan.order {
        let module = modules_by_name.get(name).ok_or_else(|| EngineError::UnknownModule(name.clone()))?;
        let result = module.step(working.clone()).await.map_err(EngineError::Module)?;
        working.products.extend(result.products);
    }

    dataspace.put(working).await.map_err(EngineError::DataSpace)?;
    Ok(())
}

#[cfg(test)]
#[path = "task_manager_tests.rs"]
mod tests;
