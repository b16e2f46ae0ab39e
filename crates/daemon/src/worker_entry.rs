// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bodies run inside the self-re-exec `--source-worker` and
//! `--channel-worker` subcommands. The supervisor never runs a source's
//! produce loop or a channel's task manager in-process: it spawns the
//! current binary again with one of these hidden subcommands and a
//! path to a JSON file describing what to run, so the worker reads its
//! handoff config from a file the parent wrote rather than from a long
//! list of individual flags.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use de_bus::{Bus, BrokerUrl, Exchange, RedisBus};
use de_core::{ChannelState, GenerationSequence, Product, StateCell};
use de_dataspace::{DataSpace, InMemoryDataSpace, TaskManagerId};
use de_engine::{run_source_loop, run_task_manager, TaskManagerConfig, WorkflowPlan};
use de_modules::{Module, ModuleDeclaration, ModuleLoader};
use serde::{Deserialize, Serialize};

use crate::module_loader::UnimplementedModuleLoader;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceWorkerConfig {
    pub taskmanager_id: String,
    pub module_class: String,
    pub module_config: serde_json::Value,
    pub produces: BTreeSet<Product>,
    pub period_secs: f64,
    pub routing_key: String,
    pub broker_url: String,
    pub exchange: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelWorkerConfig {
    pub channel: String,
    pub plan: WorkflowPlan,
    pub modules: Vec<ModuleDeclaration>,
    /// `(queue_name, routing_key)` for each source this channel consumes.
    pub queue_info: Vec<(String, String)>,
    pub broker_url: String,
    pub exchange: String,
}

async fn connect_bus(broker_url: &str, exchange: &str) -> anyhow::Result<Arc<dyn Bus>> {
    let url = BrokerUrl::parse(broker_url)?;
    let bus = RedisBus::connect(&url, Exchange::new(exchange)).await?;
    Ok(Arc::new(bus))
}

/// The cooperative-offline bridge across the process boundary: the
/// parent's `take_offline`/`stop` send SIGUSR1 (see
/// `WorkerProcess::request_offline`); this installs the worker-side
/// half, writing `OFFLINE` into this process's own state cell so the
/// produce/task-manager loop observes it on its next boundary and winds
/// down on its own rather than waiting to be SIGTERM'd.
fn install_offline_handler(state: Arc<StateCell>) -> anyhow::Result<()> {
    let mut signals = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::user_defined1())?;
    tokio::spawn(async move {
        while signals.recv().await.is_some() {
            state.set(ChannelState::Offline);
        }
    });
    Ok(())
}

/// Run a source worker to completion. Never returns until the state
/// cell is driven offline or the module step loop fails fatally.
pub async fn run_source_worker(config_path: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(config_path)?;
    let cfg: SourceWorkerConfig = serde_json::from_str(&text)?;

    let loader = UnimplementedModuleLoader;
    let module: Arc<dyn Module> = Arc::from(loader.load(&cfg.module_class, &cfg.module_config)?);

    let bus = connect_bus(&cfg.broker_url, &cfg.exchange).await?;
    // The real multi-process data space is an external collaborator
    // (see DESIGN.md); each worker process runs against its own
    // in-memory store until a networked backend is wired in.
    let dataspace: Arc<dyn DataSpace> = Arc::new(InMemoryDataSpace::new());
    let state = Arc::new(StateCell::new(ChannelState::Boot));
    install_offline_handler(Arc::clone(&state))?;
    let generations = Arc::new(GenerationSequence::new());

    run_source_loop(
        TaskManagerId::from(cfg.taskmanager_id.as_str()),
        Duration::from_secs_f64(cfg.period_secs),
        module,
        state,
        bus,
        dataspace,
        cfg.routing_key,
        generations,
    )
    .await?;
    Ok(())
}

/// Run a channel worker's task manager to completion.
pub async fn run_channel_worker(config_path: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(config_path)?;
    let cfg: ChannelWorkerConfig = serde_json::from_str(&text)?;

    let loader = UnimplementedModuleLoader;
    let mut modules_by_name = std::collections::HashMap::with_capacity(cfg.modules.len());
    for decl in &cfg.modules {
        let module: Arc<dyn Module> = Arc::from(loader.load(&decl.module_class, &decl.config)?);
        modules_by_name.insert(decl.name.clone(), module);
    }

    let bus = connect_bus(&cfg.broker_url, &cfg.exchange).await?;
    let dataspace: Arc<dyn DataSpace> = Arc::new(InMemoryDataSpace::new());
    let state = Arc::new(StateCell::new(ChannelState::Boot));
    install_offline_handler(Arc::clone(&state))?;

    let task_cfg = TaskManagerConfig {
        channel: cfg.channel,
        plan: cfg.plan,
        modules: cfg.modules,
        queue_info: cfg.queue_info,
    };

    run_task_manager(task_cfg, state, bus, dataspace, modules_by_name).await?;
    Ok(())
}

#[cfg(test)]
#[path = "worker_entry_tests.rs"]
mod tests;
