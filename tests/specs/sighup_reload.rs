//! End-to-end scenario 5: the SIGHUP handler's in-process effect —
//! `Supervisor::reload` stops everything currently running and starts
//! fresh from whatever channel configs are on disk.

use crate::prelude::*;

#[tokio::test]
async fn reload_restarts_from_disk() {
    let harness = Harness::sleepy();
    harness.write_channel("alpha", empty_channel_toml());

    assert_eq!(harness.supervisor.start_channels().await, "OK");
    assert!(harness.supervisor.status().contains("channel alpha"));

    assert_eq!(harness.supervisor.reload().await, "OK");
    assert!(harness.supervisor.status().contains("channel alpha"), "reload should bring alpha back up");

    harness.supervisor.stop_channels().await;
    assert_eq!(harness.supervisor.status(), "No channels or sources are running.");
}

#[tokio::test]
async fn reload_picks_up_channels_added_since_the_last_start() {
    let harness = Harness::sleepy();
    harness.write_channel("alpha", empty_channel_toml());
    assert_eq!(harness.supervisor.start_channels().await, "OK");

    harness.write_channel("beta", empty_channel_toml());
    assert_eq!(harness.supervisor.reload().await, "OK");

    let status = harness.supervisor.status();
    assert!(status.contains("channel alpha"), "{status}");
    assert!(status.contains("channel beta"), "{status}");

    harness.supervisor.stop_channels().await;
}
