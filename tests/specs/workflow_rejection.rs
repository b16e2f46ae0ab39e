//! End-to-end scenario 3: a channel whose logic module consumes a
//! product nobody produces is rejected by the workflow validator before
//! any worker process is spawned, and leaves no trace in the registry.

use crate::prelude::*;

#[tokio::test]
async fn channel_consuming_an_unknown_product_is_rejected() {
    let harness = Harness::cooperative();

    harness.write_channel(
        "broken",
        r#"
sources = []
transforms = []
publishers = []

[[logic]]
name = "decide"
module_class = "decisionengine.logic.Decide"
kind = "logic"
consumes = ["nonexistent"]
"#,
    );

    let outcome = harness.supervisor.start_channel("broken").await;
    assert!(outcome.contains("consumes unknown product"), "{outcome}");
    assert_eq!(harness.supervisor.status(), "No channels or sources are running.");
}

#[tokio::test]
async fn a_publisher_that_declares_produces_is_rejected() {
    let harness = Harness::cooperative();

    harness.write_channel(
        "also_broken",
        r#"
sources = []
transforms = []
logic = []

[[publishers]]
name = "announce"
module_class = "decisionengine.publishers.Announce"
kind = "publisher"
produces = ["oops"]
"#,
    );

    let outcome = harness.supervisor.start_channel("also_broken").await;
    assert!(outcome.contains("declares produces"), "{outcome}");
    assert_eq!(harness.supervisor.status(), "No channels or sources are running.");
}
