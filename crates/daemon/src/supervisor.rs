// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C7 — the supervisor. Every public method here corresponds to one
//! administrative RPC; per the error-handling policy, none of them
//! raise. A failure becomes a human-readable string in the return
//! value, matching what the RPC surface sends back to `dectl`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use de_bus::Bus;
use de_core::{ChannelState, GenerationId, ModuleClass, Product, StateCell};
use de_dataspace::{DataSpace, TaskManagerId};
use de_engine::{ChannelRegistry, ChannelWorker, EngineError, SourceConfig, SourceRegistry};
use de_wire::StopState;
use parking_lot::Mutex as SyncMutex;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::{ChannelConfig, GlobalConfig};
use crate::errors::SupervisorError;
use crate::reaper::ReaperHandle;
use crate::worker_entry::{ChannelWorkerConfig, SourceWorkerConfig};

static WORKER_CONFIG_SEQ: AtomicU64 = AtomicU64::new(0);

/// How long a just-spawned channel worker gets to survive before the
/// supervisor treats it as having come up successfully.
const BRINGUP_GRACE: Duration = Duration::from_millis(200);

pub struct Supervisor {
    global: GlobalConfig,
    bus: Arc<dyn Bus>,
    dataspace: Arc<dyn DataSpace>,
    channel_registry: Arc<ChannelRegistry>,
    source_registry: Arc<SourceRegistry>,
    reaper: ReaperHandle,
    self_exe: PathBuf,
    worker_config_dir: PathBuf,
    log_level: SyncMutex<String>,
}

async fn wait_while(state: Arc<StateCell>, s: ChannelState, timeout: Option<Duration>) -> bool {
    tokio::task::spawn_blocking(move || state.wait_while(s, timeout)).await.unwrap_or(false)
}

/// Interpret `query_tool`'s `start_time` as a generation-id floor: a
/// value that doesn't parse as a generation number is treated as "from
/// the beginning" rather than failing the RPC.
fn parse_generation_floor(start_time: &str) -> GenerationId {
    start_time.parse::<u64>().map(GenerationId::nth).unwrap_or(GenerationId::FIRST)
}

impl Supervisor {
    pub fn new(
        global: GlobalConfig,
        bus: Arc<dyn Bus>,
        dataspace: Arc<dyn DataSpace>,
        self_exe: PathBuf,
        worker_config_dir: PathBuf,
    ) -> Self {
        Self {
            global,
            bus,
            dataspace,
            channel_registry: Arc::new(ChannelRegistry::new()),
            source_registry: Arc::new(SourceRegistry::default()),
            reaper: ReaperHandle::new(),
            self_exe,
            worker_config_dir,
            log_level: SyncMutex::new("info".to_string()),
        }
    }

    fn shutdown_timeout(&self) -> Option<Duration> {
        self.global.shutdown_timeout()
    }

    fn write_worker_config<T: Serialize>(&self, label: &str, cfg: &T) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.worker_config_dir)?;
        let seq = WORKER_CONFIG_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = self.worker_config_dir.join(format!("{label}-{seq}.json"));
        std::fs::write(&path, serde_json::to_vec(cfg)?)?;
        Ok(path)
    }

    pub async fn ping(&self) -> &'static str {
        "pong"
    }

    /// Block until every currently-registered channel has left `state`,
    /// or `timeout` elapses. Never raises for an empty channel set.
    pub async fn block_while(&self, state: ChannelState, timeout: Option<Duration>) -> String {
        let workers = self.channel_registry.unguarded_access();
        if workers.is_empty() {
            return "No active channels.".to_string();
        }
        let countdown = de_core::Countdown::new(timeout);
        for worker in workers {
            if !worker.is_alive().await {
                continue;
            }
            let remaining = countdown.remaining();
            let _scope = countdown.scope();
            wait_while(worker.state(), state, remaining).await;
        }
        format!("No channels remain in state {state}.")
    }

    pub async fn start_channel(&self, name: &str) -> String {
        let cfg = match ChannelConfig::load(&self.global.channel_config_dir, name) {
            Ok(cfg) => cfg,
            Err(err) => return format!("ERROR, failed to load channel {name:?}: {err}"),
        };
        match self.start_channel_impl(name, cfg).await {
            Ok(()) => "OK".to_string(),
            Err(SupervisorError::ChannelAlreadyRunning(name)) => {
                format!("ERROR, channel {name} is running")
            }
            Err(err) => format!("ERROR, {err}"),
        }
    }

    async fn start_channel_impl(&self, requested: &str, cfg: ChannelConfig) -> Result<(), SupervisorError> {
        let name = cfg.effective_name(requested);
        if self.channel_registry.contains(&name) {
            return Err(SupervisorError::ChannelAlreadyRunning(name));
        }

        let mut periods: BTreeMap<String, f64> = BTreeMap::new();
        let mut source_configs = Vec::with_capacity(cfg.sources.len());
        let mut source_products: BTreeSet<Product> = BTreeSet::new();
        for decl in &cfg.sources {
            periods.insert(decl.key.clone(), decl.period_secs);
            source_products.extend(decl.produces.iter().cloned());
            source_configs.push(SourceConfig {
                key: decl.key.clone(),
                module_class: ModuleClass::new(decl.module_class.clone()),
                config: decl.config.clone(),
                produces: decl.produces.clone(),
            });
        }

        let workers = self.source_registry.update(&name, source_configs)?;

        let modules = cfg.modules();
        let plan = de_engine::validate(&name, &source_products, &modules)?;

        let routing_keys: Vec<String> = workers.values().map(|w| w.routing_key().to_string()).collect();
        let queue_info: Vec<(String, String)> =
            workers.values().map(|w| (w.queue_name().to_string(), w.routing_key().to_string())).collect();

        let mut produces_map = BTreeMap::new();
        let mut consumes_map = BTreeMap::new();
        for module in &modules {
            produces_map.insert(module.name.clone(), module.produces.clone());
            consumes_map.insert(module.name.clone(), module.consumes.clone());
        }

        let worker = Arc::new(ChannelWorker::new(name.clone(), routing_keys, produces_map, consumes_map));
        self.channel_registry.insert(Arc::clone(&worker))?;

        let channel_cfg = ChannelWorkerConfig {
            channel: name.clone(),
            plan,
            modules,
            queue_info,
            broker_url: self.global.broker_url.clone(),
            exchange: self.global.exchange.clone(),
        };
        let config_path = self
            .write_worker_config(&format!("channel-{name}"), &channel_cfg)
            .map_err(|err| SupervisorError::Engine(EngineError::Process(de_engine::ProcessError::Spawn(err))))?;
        let exe = self.self_exe.display().to_string();
        worker
            .start(&exe, &["--channel-worker".to_string(), config_path.display().to_string()])
            .await
            .map_err(SupervisorError::Engine)?;

        self.confirm_bringup(&worker, &name).await?;

        for (key, source_worker) in &workers {
            if source_worker.is_alive().await {
                continue;
            }
            if source_worker.exitcode().await == Some(0) {
                self.stop_worker(&worker, Some(Duration::from_secs(5))).await;
                self.channel_registry.remove(&name);
                self.source_registry.prune(&name, worker.routing_keys()).await;
                return Err(SupervisorError::Engine(EngineError::SourceAlreadyCompleted { channel: name }));
            }
            let period_secs = periods.get(key).copied().unwrap_or(60.0);
            let source_cfg = SourceWorkerConfig {
                taskmanager_id: source_worker.routing_key().to_string(),
                module_class: source_worker.identity().module_class().as_str().to_string(),
                module_config: source_worker.identity().config().clone(),
                produces: source_worker.produces().clone(),
                period_secs,
                routing_key: source_worker.routing_key().to_string(),
                broker_url: self.global.broker_url.clone(),
                exchange: self.global.exchange.clone(),
            };
            let path = self
                .write_worker_config(&format!("source-{key}"), &source_cfg)
                .map_err(|err| SupervisorError::Engine(EngineError::Process(de_engine::ProcessError::Spawn(err))))?;
            source_worker
                .start(&exe, &["--source-worker".to_string(), path.display().to_string()])
                .await
                .map_err(SupervisorError::Engine)?;
        }

        self.confirm_bringup(&worker, &name).await?;
        Ok(())
    }

    /// The child's `ACTIVE -> STEADY` bringup transition lives inside
    /// its own private state cell and cannot be observed across the
    /// process boundary, so the supervisor substitutes the signal it
    /// can observe: the process surviving a short grace window rather
    /// than exiting immediately.
    async fn confirm_bringup(&self, worker: &ChannelWorker, name: &str) -> Result<(), SupervisorError> {
        tokio::time::sleep(BRINGUP_GRACE).await;
        if worker.is_alive().await {
            return Ok(());
        }
        let code = worker.exitcode().await;
        self.channel_registry.remove(name);
        self.source_registry.prune(name, worker.routing_keys()).await;
        Err(SupervisorError::StartupExited { channel: name.to_string(), code })
    }

    /// Start every channel declared in the channel config directory,
    /// sequentially. A per-channel failure is logged, not fatal to the
    /// batch — parallel startup is deliberately disallowed.
    pub async fn start_channels(&self) -> String {
        let names = match ChannelConfig::list(&self.global.channel_config_dir) {
            Ok(names) => names,
            Err(err) => return format!("ERROR, failed to list channel configs: {err}"),
        };
        for name in names {
            let outcome = self.start_channel(&name).await;
            if outcome != "OK" {
                warn!(channel = %name, outcome = %outcome, "channel failed to start");
            }
        }
        "OK".to_string()
    }

    /// Stop a channel, waiting indefinitely for it to exit cleanly.
    pub async fn stop_channel(&self, name: &str) -> (StopState, String) {
        let state = self.rm_channel(name, None).await;
        (state, self.describe_stop(name, state))
    }

    /// Stop a channel, force-killing it after `timeout` (falling back to
    /// the configured shutdown timeout when not given).
    pub async fn kill_channel(&self, name: &str, timeout: Option<Duration>) -> (StopState, String) {
        let timeout = timeout.or_else(|| self.shutdown_timeout());
        let secs = timeout.map(|d| d.as_secs()).unwrap_or(0);
        let state = self.rm_channel(name, timeout).await;
        let message = match state {
            StopState::NotFound => format!("ERROR, no such channel {name}"),
            StopState::Clean => format!("Channel {name} stopped cleanly."),
            StopState::Terminated => {
                format!("Channel {name} has been killed due to shutdown timeout ({secs} seconds).")
            }
        };
        (state, message)
    }

    /// The internal primitive both `stop_channel` and `kill_channel`
    /// dispatch to, also reachable directly over RPC.
    pub async fn rm_channel_rpc(&self, name: &str, timeout: Option<Duration>) -> (StopState, String) {
        let state = self.rm_channel(name, timeout).await;
        (state, self.describe_stop(name, state))
    }

    fn describe_stop(&self, name: &str, state: StopState) -> String {
        match state {
            StopState::NotFound => format!("ERROR, no such channel {name}"),
            StopState::Clean => format!("Channel {name} stopped cleanly."),
            StopState::Terminated => format!("Channel {name} was terminated."),
        }
    }

    async fn rm_channel(&self, name: &str, timeout: Option<Duration>) -> StopState {
        let worker = {
            let registry = self.channel_registry.access();
            registry.get(name).cloned()
        };
        let Some(worker) = worker else {
            return StopState::NotFound;
        };
        let routing_keys = worker.routing_keys().to_vec();
        let state = self.stop_worker(&worker, timeout).await;
        self.channel_registry.remove(name);
        self.source_registry.prune(name, &routing_keys).await;
        state
    }

    async fn stop_worker(&self, worker: &ChannelWorker, timeout: Option<Duration>) -> StopState {
        if !worker.is_alive().await {
            return StopState::Clean;
        }
        worker.take_offline().await;
        if worker.join(timeout).await.is_some() {
            return StopState::Clean;
        }
        if let Err(err) = worker.terminate().await {
            error!(%err, "failed to terminate channel worker");
        }
        StopState::Terminated
    }

    /// Stop every running channel, sharing one timeout budget across
    /// them, then release every source they held.
    pub async fn stop_channels(&self) -> String {
        let countdown = de_core::Countdown::new(self.shutdown_timeout());
        let workers = {
            let registry = self.channel_registry.access();
            registry.values().cloned().collect::<Vec<_>>()
        };
        for worker in &workers {
            let remaining = countdown.remaining();
            let _scope = countdown.scope();
            self.stop_worker(worker, remaining).await;
            self.channel_registry.remove(worker.name());
            self.source_registry.prune(worker.name(), worker.routing_keys()).await;
        }
        self.source_registry.remove_all(countdown.remaining()).await;
        "OK".to_string()
    }

    /// Full shutdown: stop every channel and source, stop the reaper,
    /// best-effort flush the broker's keyspace.
    pub async fn stop(&self) -> String {
        self.stop_channels().await;
        self.reaper.stop();
        if let Err(err) = self.bus.flush_db().await {
            warn!(%err, "failed to flush broker keyspace on shutdown");
        }
        "OK".to_string()
    }

    /// SIGHUP handler: stop everything, then start fresh from whatever
    /// is currently on disk.
    pub async fn reload(&self) -> String {
        info!("reloading configuration");
        self.reaper.stop();
        self.stop_channels().await;
        let result = self.start_channels().await;
        self.reaper.start(Duration::from_secs(self.global.reaper_delay_secs));
        result
    }

    /// Periodic housekeeping: release sources held by channels whose
    /// workers are no longer healthy.
    pub async fn service_actions(&self) {
        let workers = self.channel_registry.unguarded_access();
        for worker in workers {
            if worker.is_alive().await {
                continue;
            }
            self.source_registry.detach_channel(worker.name(), worker.routing_keys()).await;
        }
    }

    pub fn status(&self) -> String {
        let channels = self.channel_registry.unguarded_access();
        let sources = self.source_registry.unguarded_access();
        if channels.is_empty() && sources.is_empty() {
            return "No channels or sources are running.".to_string();
        }
        let mut lines = Vec::new();
        for channel in &channels {
            lines.push(format!("channel {} [{}]", channel.name(), channel.state().get()));
        }
        for source in &sources {
            lines.push(format!("source {} [{}] refs={}", source.routing_key(), source.state().get(), source.refcount()));
        }
        lines.join("\n")
    }

    pub fn queue_status(&self) -> String {
        let sources = self.source_registry.unguarded_access();
        if sources.is_empty() {
            return "No source queues are active.".to_string();
        }
        let rows = sources.iter().map(|s| vec![s.queue_name().to_string(), s.refcount().to_string()]).collect();
        let frame = de_wire::TableFrame { columns: vec!["queue".to_string(), "refs".to_string()], rows };
        frame.render(de_wire::TableFormat::default())
    }

    pub fn product_dependencies(&self) -> String {
        let channels = self.channel_registry.unguarded_access();
        if channels.is_empty() {
            return "No channels are running.".to_string();
        }
        let mut lines = Vec::new();
        for channel in &channels {
            for (module, consumes) in channel.consumes() {
                if consumes.is_empty() {
                    continue;
                }
                let products: Vec<&str> = consumes.iter().map(|p| p.as_str()).collect();
                lines.push(format!("{}:{} depends on {}", channel.name(), module, products.join(", ")));
            }
        }
        if lines.is_empty() {
            "No module dependencies declared.".to_string()
        } else {
            lines.join("\n")
        }
    }

    pub fn show_de_config(&self) -> String {
        toml::to_string_pretty(&self.global).unwrap_or_else(|err| format!("ERROR, {err}"))
    }

    pub fn show_config(&self, target: de_wire::ConfigTarget) -> String {
        match target {
            de_wire::ConfigTarget::All => match ChannelConfig::list(&self.global.channel_config_dir) {
                Ok(names) => names.join("\n"),
                Err(err) => format!("ERROR, {err}"),
            },
            de_wire::ConfigTarget::Channel(name) => {
                match ChannelConfig::load(&self.global.channel_config_dir, &name) {
                    Ok(cfg) => toml::to_string_pretty(&cfg).unwrap_or_else(|err| format!("ERROR, {err}")),
                    Err(err) => format!("ERROR, {err}"),
                }
            }
        }
    }

    pub async fn print_product(&self, product: &str, format: de_wire::TableFormat) -> String {
        let product = Product::from(product);
        let channels = self.channel_registry.unguarded_access();
        let mut rows = Vec::new();
        for channel in &channels {
            if !channel.produces().values().any(|set| set.contains(&product)) {
                continue;
            }
            let id = TaskManagerId::from(channel.name());
            if let Ok(Some(block)) = self.dataspace.latest(&id).await {
                if let Some(value) = block.products.get(&product) {
                    rows.push(vec![channel.name().to_string(), block.generation.to_string(), value.to_string()]);
                }
            }
        }
        if rows.is_empty() {
            return format!("No data available for product {product}.");
        }
        let frame = de_wire::TableFrame {
            columns: vec!["channel".to_string(), "generation".to_string(), "value".to_string()],
            rows,
        };
        frame.render(format)
    }

    /// Like `print_product`, but when `start_time` is given, returns
    /// every retained generation at or after it instead of just the
    /// latest. A `DataBlock` carries no wall-clock timestamp (see
    /// DESIGN.md), so `start_time` is parsed as a generation-id floor.
    pub async fn query_tool(&self, product: &str, format: de_wire::TableFormat, start_time: Option<&str>) -> String {
        let product_key = Product::from(product);
        let channels = self.channel_registry.unguarded_access();
        let mut rows = Vec::new();
        for channel in &channels {
            if !channel.produces().values().any(|set| set.contains(&product_key)) {
                continue;
            }
            let id = TaskManagerId::from(channel.name());
            let blocks = match start_time {
                Some(start_time) => {
                    let floor = parse_generation_floor(start_time);
                    match self.dataspace.history(&id).await {
                        Ok(blocks) => blocks.into_iter().filter(|b| b.generation >= floor).collect(),
                        Err(err) => {
                            warn!(channel = %channel.name(), %err, "failed to read data space history");
                            Vec::new()
                        }
                    }
                }
                None => match self.dataspace.latest(&id).await {
                    Ok(block) => block.into_iter().collect(),
                    Err(err) => {
                        warn!(channel = %channel.name(), %err, "failed to read data space");
                        Vec::new()
                    }
                },
            };
            for block in blocks {
                if let Some(value) = block.products.get(&product_key) {
                    rows.push(vec![channel.name().to_string(), block.generation.to_string(), value.to_string()]);
                }
            }
        }
        if rows.is_empty() {
            return format!("No data available for product {product_key}.");
        }
        let frame = de_wire::TableFrame {
            columns: vec!["channel".to_string(), "generation".to_string(), "value".to_string()],
            rows,
        };
        frame.render(format)
    }

    pub fn print_products(&self) -> String {
        let channels = self.channel_registry.unguarded_access();
        let mut rows = Vec::new();
        for channel in &channels {
            for (module, produces) in channel.produces() {
                for product in produces {
                    rows.push(vec![product.as_str().to_string(), module.clone(), channel.name().to_string()]);
                }
            }
        }
        if rows.is_empty() {
            return "No products are declared.".to_string();
        }
        let frame = de_wire::TableFrame {
            columns: vec!["product".to_string(), "module".to_string(), "channel".to_string()],
            rows,
        };
        frame.render(de_wire::TableFormat::default())
    }

    pub fn get_log_level(&self) -> String {
        self.log_level.lock().clone()
    }

    pub fn get_channel_log_level(&self, name: &str) -> String {
        match self.channel_registry.get(name) {
            Some(worker) => format!("{:?}", worker.get_loglevel()),
            None => format!("ERROR, no such channel {name}"),
        }
    }

    pub fn set_channel_log_level(&self, name: &str, level: &str) -> String {
        let Some(worker) = self.channel_registry.get(name) else {
            return format!("ERROR, no such channel {name}");
        };
        match level.parse() {
            Ok(filter) => {
                worker.set_loglevel_value(filter);
                format!("Channel {name} log level set to {level}.")
            }
            Err(_) => format!("ERROR, invalid log level {level:?}"),
        }
    }

    pub fn reaper_start(&self, delay: Option<Duration>) -> String {
        self.reaper.start(delay.unwrap_or_else(|| Duration::from_secs(self.global.reaper_delay_secs)));
        "OK".to_string()
    }

    pub fn reaper_stop(&self) -> String {
        self.reaper.stop();
        "OK".to_string()
    }

    pub fn reaper_status(&self) -> String {
        self.reaper.status()
    }

    pub fn metrics(&self) -> String {
        let channels = self.channel_registry.len();
        let sources = self.source_registry.len();
        format!("channels_running {channels}\nsources_running {sources}\n")
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
