// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Global and per-channel configuration, loaded as TOML from the path
//! resolved by `env::config_path` / the global config's
//! `channel_config_dir`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use de_core::Product;
use de_modules::ModuleDeclaration;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::LifecycleError;

/// The supervisor's own configuration: broker connection, exchange name,
/// where channel configs live, and the admin RPC port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_broker_url")]
    pub broker_url: String,
    #[serde(default = "default_exchange")]
    pub exchange: String,
    #[serde(default = "default_channel_config_dir")]
    pub channel_config_dir: PathBuf,
    #[serde(default)]
    pub shutdown_timeout_secs: Option<u64>,
    #[serde(default = "default_reaper_delay_secs")]
    pub reaper_delay_secs: u64,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl GlobalConfig {
    pub fn load(path: &Path) -> Result<Self, LifecycleError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| LifecycleError::ConfigRead { path: path.to_path_buf(), source })?;
        toml::from_str(&text)
            .map_err(|source| LifecycleError::ConfigParse { path: path.to_path_buf(), source })
    }

    pub fn shutdown_timeout(&self) -> Option<Duration> {
        self.shutdown_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            broker_url: default_broker_url(),
            exchange: default_exchange(),
            channel_config_dir: default_channel_config_dir(),
            shutdown_timeout_secs: Some(10),
            reaper_delay_secs: default_reaper_delay_secs(),
            port: default_port(),
        }
    }
}

fn default_broker_url() -> String {
    de_bus::BrokerUrl::DEFAULT.to_string()
}

fn default_exchange() -> String {
    de_bus::Exchange::DEFAULT_NAME.to_string()
}

fn default_channel_config_dir() -> PathBuf {
    PathBuf::from("test-etc/channels")
}

fn default_reaper_delay_secs() -> u64 {
    300
}

fn default_port() -> u16 {
    8888
}

/// One source declaration inside a channel's `sources` config block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDecl {
    /// The key this source is referred to by within the channel.
    pub key: String,
    pub module_class: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub produces: BTreeSet<Product>,
    pub period_secs: f64,
}

/// A channel's on-disk configuration: its sources plus the
/// transforms/logic/publishers the workflow validator orders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Overrides the name this channel is started under, distinct from
    /// the config file's own stem.
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceDecl>,
    #[serde(default)]
    pub transforms: Vec<ModuleDeclaration>,
    #[serde(default)]
    pub logic: Vec<ModuleDeclaration>,
    #[serde(default)]
    pub publishers: Vec<ModuleDeclaration>,
}

impl ChannelConfig {
    pub fn load(dir: &Path, name: &str) -> Result<Self, LifecycleError> {
        let path = dir.join(format!("{name}.toml"));
        let text = std::fs::read_to_string(&path)
            .map_err(|source| LifecycleError::ConfigRead { path: path.clone(), source })?;
        toml::from_str(&text).map_err(|source| LifecycleError::ConfigParse { path, source })
    }

    /// Every channel name declared in `dir` (one `.toml` file per
    /// channel), used by `start_channels` and the SIGHUP reload path.
    pub fn list(dir: &Path) -> Result<Vec<String>, LifecycleError> {
        let mut names = Vec::new();
        let entries = std::fs::read_dir(dir)
            .map_err(|source| LifecycleError::ConfigRead { path: dir.to_path_buf(), source })?;
        for entry in entries {
            let entry = entry
                .map_err(|source| LifecycleError::ConfigRead { path: dir.to_path_buf(), source })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("toml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// The name this channel actually runs under, honoring an optional
    /// `channel_name` override inside the config.
    pub fn effective_name(&self, requested: &str) -> String {
        self.channel_name.clone().unwrap_or_else(|| requested.to_string())
    }

    /// Transforms, logic, and publishers concatenated for the workflow
    /// validator, in that order (tie-breaks are lexicographic by name
    /// regardless of this ordering).
    pub fn modules(&self) -> Vec<ModuleDeclaration> {
        let mut modules =
            Vec::with_capacity(self.transforms.len() + self.logic.len() + self.publishers.len());
        modules.extend(self.transforms.iter().cloned());
        modules.extend(self.logic.iter().cloned());
        modules.extend(self.publishers.iter().cloned());
        modules
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
