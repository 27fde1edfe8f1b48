//! CLI round-trip tests
//!
//! Drives the `sim` binary end to end: new, run, verify, and the exit
//! codes for bad input.

use std::fs;
use std::process::Command;

fn sim_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sim"))
}

#[test]
fn test_new_prints_snapshot() {
    let output = sim_bin().args(["new", "alpha"]).output().expect("binary runs");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("snapshot is one JSON document");
    assert_eq!(value["meta"]["seed"], "alpha");
    assert_eq!(value["meta"]["turnIndex"].as_u64(), None); // snake_case keys
    assert!(value["meta"]["turn_index"].is_u64());
}

#[test]
fn test_new_is_reproducible() {
    let a = sim_bin().args(["new", "alpha"]).output().unwrap();
    let b = sim_bin().args(["new", "alpha"]).output().unwrap();
    assert_eq!(a.stdout, b.stdout);
}

#[test]
fn test_run_then_verify_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let genesis_path = dir.path().join("genesis.json");
    let first_path = dir.path().join("first.json");
    let second_path = dir.path().join("second.json");

    let genesis = sim_bin().args(["new", "roundtrip"]).output().unwrap();
    assert!(genesis.status.success());
    fs::write(&genesis_path, snapshot_line(&genesis.stdout)).unwrap();

    // Same genesis, same 48 hours, twice.
    for path in [&first_path, &second_path] {
        let run = sim_bin()
            .args(["run", genesis_path.to_str().unwrap(), "48"])
            .output()
            .unwrap();
        assert!(run.status.success());
        fs::write(path, snapshot_line(&run.stdout)).unwrap();
    }

    let verify = sim_bin()
        .args([
            "verify",
            first_path.to_str().unwrap(),
            second_path.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(verify.status.success(), "identical runs must verify equal");
}

#[test]
fn test_verify_detects_divergence() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.json");
    let b = dir.path().join("b.json");
    fs::write(&a, b"{\"x\":1}").unwrap();
    fs::write(&b, b"{\"x\":2}").unwrap();
    let verify = sim_bin()
        .args(["verify", a.to_str().unwrap(), b.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(verify.status.code(), Some(1));
}

#[test]
fn test_malformed_snapshot_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.json");
    fs::write(&path, b"this is not a snapshot").unwrap();
    let run = sim_bin()
        .args(["run", path.to_str().unwrap(), "1"])
        .output()
        .unwrap();
    assert_eq!(run.status.code(), Some(2));
}

#[test]
fn test_bad_content_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tables.toml");
    fs::write(&path, b"not even close = ").unwrap();
    let out = sim_bin()
        .args(["new", "seed", "--content", path.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
}

/// The run command prints the snapshot on the first line, then the log as
/// JSONL; tests only want the snapshot.
fn snapshot_line(stdout: &[u8]) -> Vec<u8> {
    let text = String::from_utf8_lossy(stdout);
    text.lines().next().unwrap_or("").as_bytes().to_vec()
}
