//! A CLI-level smoke test: `dectl --help` and a subcommand's `--help`
//! both describe the administrative surface without needing a running
//! supervisor to talk to.

use assert_cmd::Command;

#[test]
fn dectl_help_lists_the_administrative_subcommands() {
    let mut cmd = Command::cargo_bin("dectl").expect("dectl binary");
    cmd.arg("--help");
    let assert = cmd.assert().success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(output.contains("start-channel"), "{output}");
    assert!(output.contains("stop-channel"), "{output}");
    assert!(output.contains("status"), "{output}");
}

#[test]
fn dectl_rejects_unknown_subcommands() {
    let mut cmd = Command::cargo_bin("dectl").expect("dectl binary");
    cmd.arg("not-a-real-command");
    cmd.assert().failure();
}
