// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use super::*;

#[tokio::test]
async fn join_returns_exit_code_for_a_short_lived_process() {
    let mut proc = WorkerProcess::spawn("true", &[]).unwrap();
    let code = proc.join(Some(Duration::from_secs(5))).await;
    assert_eq!(code, Some(0));
    assert!(!proc.is_alive());
}

#[tokio::test]
async fn join_times_out_on_a_long_running_process() {
    let mut proc = WorkerProcess::spawn("sleep", &["5".to_string()]).unwrap();
    let code = proc.join(Some(Duration::from_millis(50))).await;
    assert_eq!(code, None);
    assert!(proc.is_alive());
    proc.terminate().unwrap();
}

#[tokio::test]
async fn terminate_on_already_exited_process_is_a_noop() {
    let mut proc = WorkerProcess::spawn("true", &[]).unwrap();
    proc.join(Some(Duration::from_secs(5))).await;
    assert!(proc.terminate().is_ok());
}

#[tokio::test]
async fn terminate_then_join_observes_the_kill() {
    let mut proc = WorkerProcess::spawn("sleep", &["30".to_string()]).unwrap();
    proc.terminate().unwrap();
    let code = proc.join(Some(Duration::from_secs(5))).await;
    assert!(code.is_some());
}
