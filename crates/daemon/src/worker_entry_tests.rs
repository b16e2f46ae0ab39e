// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn a_missing_config_file_is_reported() {
    let result = run_source_worker(Path::new("/nonexistent/source.json")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn an_unregistered_module_class_fails_before_any_network_io() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.json");
    let cfg = SourceWorkerConfig {
        taskmanager_id: "src-a".to_string(),
        module_class: "nothing.Registered".to_string(),
        module_config: serde_json::Value::Null,
        produces: BTreeSet::new(),
        period_secs: 1.0,
        routing_key: "source.a".to_string(),
        broker_url: "redis://localhost:6399/0".to_string(),
        exchange: "test_exchange".to_string(),
    };
    std::fs::write(&path, serde_json::to_string(&cfg).unwrap()).unwrap();

    let result = run_source_worker(&path).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn channel_worker_also_fails_on_an_unregistered_module_class() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("channel.json");
    let cfg = ChannelWorkerConfig {
        channel: "ch1".to_string(),
        plan: WorkflowPlan { order: vec!["t1".to_string()] },
        modules: vec![ModuleDeclaration {
            name: "t1".to_string(),
            module_class: "nothing.Registered".to_string(),
            kind: de_modules::ModuleKind::Transform,
            produces: BTreeSet::new(),
            consumes: BTreeSet::new(),
            config: serde_json::Value::Null,
        }],
        queue_info: Vec::new(),
        broker_url: "redis://localhost:6399/0".to_string(),
        exchange: "test_exchange".to_string(),
    };
    std::fs::write(&path, serde_json::to_string(&cfg).unwrap()).unwrap();

    let result = run_channel_worker(&path).await;
    assert!(result.is_err());
}
