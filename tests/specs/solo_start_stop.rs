//! End-to-end scenario 1: a single channel referencing a single source.
//! After `start_channel`, `status` shows the channel and its source.
//! After `stop_channel`, both disappear.

use crate::prelude::*;

#[tokio::test]
async fn solo_channel_starts_and_stops_cleanly() {
    let harness = Harness::cooperative();

    harness.write_channel(
        "alpha",
        r#"
[[sources]]
key = "srcA"
module_class = "decisionengine.sources.JobSource"
produces = ["raw"]
period_secs = 60.0

transforms = []
logic = []
publishers = []
"#,
    );

    assert_eq!(harness.supervisor.start_channel("alpha").await, "OK");

    let status = harness.supervisor.status();
    assert!(status.contains("channel alpha"), "{status}");
    assert!(status.contains("source"), "{status}");

    let (state, message) = harness.supervisor.stop_channel("alpha").await;
    assert_eq!(state, de_wire::StopState::Clean);
    assert_eq!(message, "Channel alpha stopped cleanly.");

    assert_eq!(harness.supervisor.status(), "No channels or sources are running.");
}

#[tokio::test]
async fn a_worker_that_exits_during_bringup_leaves_no_trace() {
    let harness = Harness::quick_exit();
    harness.write_channel("flaky", empty_channel_toml());

    let outcome = harness.supervisor.start_channel("flaky").await;
    assert!(outcome.contains("exited during startup"), "{outcome}");
    assert_eq!(harness.supervisor.status(), "No channels or sources are running.");
}
