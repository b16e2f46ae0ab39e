//! End-to-end scenario 6: starting an already-running channel a second
//! time is rejected without disturbing the first instance.

use crate::prelude::*;

#[tokio::test]
async fn starting_a_running_channel_again_is_rejected() {
    let harness = Harness::sleepy();
    harness.write_channel("alpha", empty_channel_toml());

    assert_eq!(harness.supervisor.start_channel("alpha").await, "OK");

    let second = harness.supervisor.start_channel("alpha").await;
    assert!(second.contains("is running"), "{second}");

    // The first instance is still the one running.
    assert!(harness.supervisor.status().contains("channel alpha"));

    let (state, _) = harness.supervisor.kill_channel("alpha", Some(std::time::Duration::from_millis(150))).await;
    assert_eq!(state, de_wire::StopState::Terminated);
}
