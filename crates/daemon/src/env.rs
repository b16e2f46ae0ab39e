// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

/// Resolves the global config file. Falls back to the test-etc default
/// location when unset.
pub fn config_path() -> PathBuf {
    std::env::var("DE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("test-etc/decisionengine.toml"))
}

/// Writable multi-process metrics directory. Its absence is fatal at
/// startup whenever the metrics endpoint is enabled.
pub fn metrics_dir() -> Option<PathBuf> {
    std::env::var("DE_METRICS_DIR").ok().map(PathBuf::from)
}
