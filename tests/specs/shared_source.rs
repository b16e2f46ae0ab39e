//! End-to-end scenario 2: two channels declaring the same source
//! (identical module class and config) share one source worker process,
//! reference-counted. The source only goes away once both channels have
//! released it.

use crate::prelude::*;

fn channel_toml() -> String {
    r#"
[[sources]]
key = "shared"
module_class = "decisionengine.sources.JobSource"
produces = ["raw"]
period_secs = 60.0

transforms = []
logic = []
publishers = []
"#
    .to_string()
}

#[tokio::test]
async fn two_channels_sharing_a_source_dedup_and_refcount() {
    let harness = Harness::cooperative();
    harness.write_channel("north", &channel_toml());
    harness.write_channel("south", &channel_toml());

    assert_eq!(harness.supervisor.start_channel("north").await, "OK");
    assert_eq!(harness.supervisor.start_channel("south").await, "OK");

    let status = harness.supervisor.status();
    assert!(status.contains("channel north"), "{status}");
    assert!(status.contains("channel south"), "{status}");
    // Exactly one source line shared by both channels, with refcount 2.
    let source_lines: Vec<&str> = status.lines().filter(|l| l.starts_with("source ")).collect();
    assert_eq!(source_lines.len(), 1, "{status}");
    assert!(source_lines[0].contains("refs=2"), "{status}");

    let (state, _) = harness.supervisor.stop_channel("north").await;
    assert_eq!(state, de_wire::StopState::Clean);

    let status = harness.supervisor.status();
    assert!(!status.contains("channel north"), "{status}");
    assert!(status.contains("channel south"), "{status}");
    assert!(status.contains("source"), "south still holds the shared source: {status}");

    let (state, _) = harness.supervisor.stop_channel("south").await;
    assert_eq!(state, de_wire::StopState::Clean);

    assert_eq!(harness.supervisor.status(), "No channels or sources are running.");
}
