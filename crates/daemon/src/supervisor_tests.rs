// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use de_bus::FakeBus;
use de_core::{GenerationId, Product};
use de_dataspace::{DataBlock, DataSpace, InMemoryDataSpace, TaskManagerId};

use super::*;

fn global_with_dir(dir: &std::path::Path) -> GlobalConfig {
    GlobalConfig { channel_config_dir: dir.to_path_buf(), ..GlobalConfig::default() }
}

fn sleepy_worker_script(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("fake_worker.sh");
    // Ignores SIGUSR1 so the cooperative offline request has no effect,
    // standing in for a worker that never reacts to `take_offline`.
    std::fs::write(&path, "#!/bin/sh\ntrap '' USR1\nexec sleep 30\n").unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn supervisor(dir: &std::path::Path, self_exe: PathBuf) -> Supervisor {
    Supervisor::new(
        global_with_dir(dir),
        Arc::new(FakeBus::new()),
        Arc::new(InMemoryDataSpace::new()),
        self_exe,
        dir.join("worker-configs"),
    )
}

fn write_empty_channel(dir: &std::path::Path, name: &str) {
    let path = dir.join(format!("{name}.toml"));
    std::fs::write(path, "sources = []\ntransforms = []\nlogic = []\npublishers = []\n").unwrap();
}

#[tokio::test]
async fn ping_responds_with_pong() {
    let dir = tempfile::tempdir().unwrap();
    let sup = supervisor(dir.path(), PathBuf::from("true"));
    assert_eq!(sup.ping().await, "pong");
}

#[tokio::test]
async fn starting_an_unknown_channel_reports_the_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let sup = supervisor(dir.path(), PathBuf::from("true"));
    let outcome = sup.start_channel("nope").await;
    assert!(outcome.starts_with("ERROR, failed to load channel"), "{outcome}");
}

#[tokio::test]
async fn status_and_queue_status_are_empty_messages_with_no_channels() {
    let dir = tempfile::tempdir().unwrap();
    let sup = supervisor(dir.path(), PathBuf::from("true"));
    assert_eq!(sup.status(), "No channels or sources are running.");
    assert_eq!(sup.queue_status(), "No source queues are active.");
    assert_eq!(sup.metrics(), "channels_running 0\nsources_running 0\n");
}

#[tokio::test]
async fn stop_channel_on_unknown_channel_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let sup = supervisor(dir.path(), PathBuf::from("true"));
    assert_eq!(sup.stop_channel("ghost").await, (StopState::NotFound, "ERROR, no such channel ghost".to_string()));
}

#[tokio::test]
async fn a_worker_that_exits_immediately_is_reported_as_startup_exited() {
    let dir = tempfile::tempdir().unwrap();
    write_empty_channel(dir.path(), "quick");
    // "true" exits 0 immediately, well inside the bringup grace window.
    let sup = supervisor(dir.path(), PathBuf::from("true"));
    let outcome = sup.start_channel("quick").await;
    assert!(outcome.contains("exited during startup"), "{outcome}");
    assert_eq!(sup.status(), "No channels or sources are running.");
}

#[tokio::test]
async fn a_channel_that_survives_bringup_can_be_started_and_stopped() {
    let dir = tempfile::tempdir().unwrap();
    write_empty_channel(dir.path(), "steady");
    let script = sleepy_worker_script(dir.path());
    let sup = supervisor(dir.path(), script);

    assert_eq!(sup.start_channel("steady").await, "OK");
    assert!(sup.status().contains("channel steady"));

    // The fake worker never reacts to `take_offline`, so only a bounded
    // kill (not the indefinite graceful stop) can reap it in a test.
    let (state, message) = sup.kill_channel("steady", Some(Duration::from_millis(100))).await;
    assert_eq!(state, StopState::Terminated);
    assert!(message.contains("killed due to shutdown timeout"), "{message}");
    assert_eq!(sup.status(), "No channels or sources are running.");
}

#[tokio::test]
async fn double_start_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_empty_channel(dir.path(), "steady");
    let script = sleepy_worker_script(dir.path());
    let sup = supervisor(dir.path(), script);

    assert_eq!(sup.start_channel("steady").await, "OK");
    let second = sup.start_channel("steady").await;
    assert!(second.contains("is running"), "{second}");

    sup.kill_channel("steady", Some(Duration::from_millis(100))).await;
}

#[tokio::test]
async fn print_product_and_query_tool_honor_format_and_start_time() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("feed.toml"),
        r#"
sources = []
logic = []
publishers = []

[[transforms]]
name = "mk"
kind = "transform"
module_class = "decisionengine.transforms.Make"
produces = ["widgets"]
"#,
    )
    .unwrap();

    let dataspace = Arc::new(InMemoryDataSpace::new());
    let script = sleepy_worker_script(dir.path());
    let sup = Supervisor::new(
        global_with_dir(dir.path()),
        Arc::new(FakeBus::new()),
        dataspace.clone(),
        script,
        dir.path().join("worker-configs"),
    );
    assert_eq!(sup.start_channel("feed").await, "OK");

    let id = TaskManagerId::from("feed");
    let widgets = Product::from("widgets");
    dataspace
        .put(DataBlock::new(id.clone(), GenerationId::FIRST, 0).with_product(widgets.clone(), serde_json::json!(1)))
        .await
        .unwrap();
    dataspace
        .put(
            DataBlock::new(id, GenerationId::FIRST.next(), 0)
                .with_product(widgets, serde_json::json!(2)),
        )
        .await
        .unwrap();

    let csv = sup.print_product("widgets", de_wire::TableFormat::Csv).await;
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("channel,generation,value"));
    assert_eq!(lines.next(), Some("feed,2,2"));
    assert_eq!(lines.next(), None);

    let psql = sup.print_product("widgets", de_wire::TableFormat::Psql).await;
    assert!(!psql.contains("widgets"), "psql render should not leak the product name: {psql}");
    assert!(psql.contains('+'), "psql render should use box-drawing: {psql}");

    let all_history = sup.query_tool("widgets", de_wire::TableFormat::Csv, Some("1")).await;
    let mut lines = all_history.lines();
    assert_eq!(lines.next(), Some("channel,generation,value"));
    assert_eq!(lines.next(), Some("feed,1,1"));
    assert_eq!(lines.next(), Some("feed,2,2"));
    assert_eq!(lines.next(), None);

    let from_second = sup.query_tool("widgets", de_wire::TableFormat::Csv, Some("2")).await;
    let mut lines = from_second.lines();
    assert_eq!(lines.next(), Some("channel,generation,value"));
    assert_eq!(lines.next(), Some("feed,2,2"));
    assert_eq!(lines.next(), None);

    let latest_only = sup.query_tool("widgets", de_wire::TableFormat::Csv, None).await;
    let mut lines = latest_only.lines();
    assert_eq!(lines.next(), Some("channel,generation,value"));
    assert_eq!(lines.next(), Some("feed,2,2"));
    assert_eq!(lines.next(), None);

    sup.kill_channel("feed", Some(Duration::from_millis(100))).await;
}

#[tokio::test]
async fn reaper_start_stop_status_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let sup = supervisor(dir.path(), PathBuf::from("true"));
    assert_eq!(sup.reaper_status(), "Reaper is stopped.");
    sup.reaper_start(Some(Duration::from_millis(0)));
    assert_eq!(sup.reaper_status(), "Reaper is running.");
    sup.reaper_stop();
    assert_eq!(sup.reaper_status(), "Reaper is stopped.");
}

#[tokio::test]
async fn show_de_config_contains_the_broker_url() {
    let dir = tempfile::tempdir().unwrap();
    let sup = supervisor(dir.path(), PathBuf::from("true"));
    assert!(sup.show_de_config().contains("broker_url"));
}

#[tokio::test]
async fn show_config_all_lists_channel_names() {
    let dir = tempfile::tempdir().unwrap();
    write_empty_channel(dir.path(), "alpha");
    write_empty_channel(dir.path(), "beta");
    let sup = supervisor(dir.path(), PathBuf::from("true"));
    let listing = sup.show_config(de_wire::ConfigTarget::All);
    assert!(listing.contains("alpha") && listing.contains("beta"));
}

#[tokio::test]
async fn stop_on_an_empty_supervisor_flushes_the_bus() {
    let dir = tempfile::tempdir().unwrap();
    let bus = Arc::new(FakeBus::new());
    let sup = Supervisor::new(
        global_with_dir(dir.path()),
        bus.clone(),
        Arc::new(InMemoryDataSpace::new()),
        PathBuf::from("true"),
        dir.path().join("worker-configs"),
    );
    assert_eq!(sup.stop().await, "OK");
    assert_eq!(bus.flush_count(), 1);
}
