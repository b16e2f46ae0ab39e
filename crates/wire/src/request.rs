// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use crate::TableFormat;

/// Which channel(s) a config-dumping RPC should target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigTarget {
    All,
    Channel(String),
}

/// Administrative request sent from `dectl` (or any RPC client) to the
/// supervisor, one variant per method in the RPC surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Liveness check; always answered with `Response::Pong`.
    Ping,

    /// Block the caller until every channel leaves `state`, or until
    /// `timeout_secs` elapses. `None` waits indefinitely.
    BlockWhile {
        state: String,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },

    /// Dump the resolved config for one channel, or all of them.
    ShowConfig { target: ConfigTarget },

    /// Dump the global (de) config.
    ShowDeConfig,

    /// Render the data-space contents of one product as a table.
    PrintProduct {
        product: String,
        #[serde(default)]
        columns: Option<Vec<String>>,
        #[serde(default)]
        query: Option<String>,
        #[serde(default)]
        types: bool,
        #[serde(default)]
        format: Option<TableFormat>,
    },

    /// List every known product and the module that produces it.
    PrintProducts,

    /// Full supervisor status: channels, states, uptime.
    Status,

    /// Per-queue backlog depths on the bus.
    QueueStatus,

    /// The workflow dependency graph for every running channel.
    ProductDependencies,

    /// Start a channel by name, loading its config from disk.
    StartChannel { name: String },

    /// Start every configured channel, sequentially.
    StartChannels,

    /// Stop a channel, waiting indefinitely for a clean exit.
    StopChannel { name: String },

    /// Stop a channel, force-killing it after `timeout_secs` (falls back
    /// to the configured shutdown timeout when omitted).
    KillChannel {
        name: String,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },

    /// Stop every running channel, sharing one timeout budget.
    StopChannels,

    /// Internal: remove one channel from the registry after stopping it.
    RmChannel {
        name: String,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },

    /// Full supervisor shutdown.
    Stop,

    /// The supervisor's own log level.
    GetLogLevel,

    /// The log level of one channel's logger.
    GetChannelLogLevel { name: String },

    /// Change the log level of one channel's logger.
    SetChannelLogLevel { name: String, level: String },

    /// (Re)start the reaper, with an optional startup delay override.
    ReaperStart {
        #[serde(default)]
        delay_secs: Option<u64>,
    },

    /// Stop the reaper.
    ReaperStop,

    /// Reaper status text.
    ReaperStatus,

    /// Query the data space for one product's history.
    QueryTool {
        product: String,
        #[serde(default)]
        format: Option<TableFormat>,
        #[serde(default)]
        start_time: Option<String>,
    },

    /// Serialized internal metrics.
    Metrics,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
