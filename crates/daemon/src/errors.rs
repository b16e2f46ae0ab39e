// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

/// Fatal startup-time failures. Printed to standard error and the
/// process exits non-zero; never surfaced through the RPC surface.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to read config file {path:?}: {source}")]
    ConfigRead { path: PathBuf, source: std::io::Error },

    #[error("failed to parse config file {path:?}: {source}")]
    ConfigParse { path: PathBuf, source: toml::de::Error },

    #[error("broker unreachable: {0}")]
    BrokerUnreachable(#[from] de_bus::BusError),

    #[error("the metrics endpoint is enabled but DE_METRICS_DIR is not set or not writable")]
    MetricsDirMissing,

    #[error("refusing to start as the superuser")]
    RunningAsRoot,

    #[error("failed to bind the administrative socket at {path:?}: {source}")]
    BindFailed { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures the supervisor's administrative operations can raise
/// internally. These never cross the RPC boundary as errors: every
/// public supervisor method renders them into a human-readable message.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("channel {0:?} is running")]
    ChannelAlreadyRunning(String),

    #[error("no such channel {0:?}")]
    ChannelNotFound(String),

    /// The worker process exited before completing bringup. Logical
    /// readiness (`ACTIVE` -> `STEADY`) is tracked inside the child
    /// process's own state cell and is not observable across the
    /// process boundary; this is the supervisor-observable substitute
    /// for that signal failing.
    #[error("channel {channel:?} exited during startup (exit code {code:?})")]
    StartupExited { channel: String, code: Option<i32> },

    #[error(transparent)]
    Engine(#[from] de_engine::EngineError),

    #[error(transparent)]
    Config(#[from] LifecycleError),
}
