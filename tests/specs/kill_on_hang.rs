//! End-to-end scenario 4: a channel worker that never reacts to
//! `take_offline` is reaped by `kill_channel`'s bounded timeout rather
//! than hanging the caller forever.

use std::time::Duration;

use crate::prelude::*;

#[tokio::test]
async fn a_hung_worker_is_force_killed_after_its_timeout() {
    let harness = Harness::sleepy();
    harness.write_channel("stuck", empty_channel_toml());

    assert_eq!(harness.supervisor.start_channel("stuck").await, "OK");
    assert!(harness.supervisor.status().contains("channel stuck"));

    let (state, message) = harness.supervisor.kill_channel("stuck", Some(Duration::from_millis(150))).await;
    assert_eq!(state, de_wire::StopState::Terminated);
    assert!(message.contains("killed due to shutdown timeout"), "{message}");
    assert_eq!(harness.supervisor.status(), "No channels or sources are running.");
}
