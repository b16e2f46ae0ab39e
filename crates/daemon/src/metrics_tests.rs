// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn a_writable_directory_passes_the_check() {
    let dir = tempfile::tempdir().unwrap();
    check_metrics_dir(dir.path()).unwrap();
}

#[test]
fn a_missing_directory_fails_the_check() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let err = check_metrics_dir(&missing).unwrap_err();
    assert!(matches!(err, LifecycleError::MetricsDirMissing));
}

#[test]
fn noop_metrics_accepts_any_observation() {
    let sink = NoopMetrics;
    sink.incr("channels.started");
}
