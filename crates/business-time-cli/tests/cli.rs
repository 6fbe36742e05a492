use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn bizhours() -> Command {
    Command::cargo_bin("bizhours").unwrap()
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn write_schedule(name: &str, json: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("bizhours-{}-{}.json", name, std::process::id()));
    fs::write(&path, json).unwrap();
    path
}

// ── Offsetting ──────────────────────────────────────────────────────────────

#[test]
fn test_add_default_schedule() {
    let out = json_output(bizhours().args([
        "add",
        "--from",
        "2016-01-18T09:00:00Z",
        "--duration",
        "45h",
    ]));
    assert_eq!(out["result"], "2016-01-22T18:00:00Z");
    assert_eq!(out["duration"]["hours"], 45);
    assert_eq!(out["duration"]["display"], "45 hours 0 seconds");
}

#[test]
fn test_add_negative_duration_walks_backward() {
    let out = json_output(bizhours().args([
        "add",
        "--from",
        "2016-01-25T09:00:00Z",
        "--duration",
        "-9h",
    ]));
    assert_eq!(out["result"], "2016-01-22T09:00:00Z");
    assert_eq!(out["duration"]["total_seconds"], -32400);
}

#[test]
fn test_subtract_default_schedule() {
    let out = json_output(bizhours().args([
        "subtract",
        "--from",
        "2016-01-25T09:00:00Z",
        "--duration",
        "9h",
    ]));
    assert_eq!(out["result"], "2016-01-22T09:00:00Z");
}

// ── Span ────────────────────────────────────────────────────────────────────

#[test]
fn test_span_with_schedule_file() {
    let path = write_schedule(
        "holiday",
        r#"{
            "timezone": "UTC",
            "windows": [{ "start": "09:00", "end": "18:00" }],
            "breaks": [{ "start": "12:00", "end": "13:00" }],
            "holidays": ["2015-12-25"]
        }"#,
    );
    let out = json_output(bizhours().arg("--config").arg(&path).args([
        "span",
        "--start",
        "2015-12-21T09:00:00Z",
        "--end",
        "2015-12-28T09:00:00Z",
    ]));
    fs::remove_file(&path).ok();

    assert_eq!(out["duration"]["total_seconds"], 32 * 3600);
    assert_eq!(out["duration"]["hours"], 32);
    assert_eq!(out["duration"]["seconds"], 0);
}

#[test]
fn test_span_reversed_is_negative() {
    let out = json_output(bizhours().args([
        "span",
        "--start",
        "2016-01-19T09:00:00Z",
        "--end",
        "2016-01-18T09:00:00Z",
    ]));
    assert_eq!(out["duration"]["hours"], -9);
}

// ── Interval lookup ─────────────────────────────────────────────────────────

#[test]
fn test_next_skips_weekend() {
    let out = json_output(bizhours().args(["next", "--at", "2016-01-23T10:00:00Z"]));
    assert_eq!(out["start"], "2016-01-25T09:00:00Z");
    assert_eq!(out["end"], "2016-01-25T18:00:00Z");
    assert_eq!(out["duration_seconds"], 9 * 3600);
}

#[test]
fn test_previous_clamps_to_anchor() {
    let out = json_output(bizhours().args(["previous", "--at", "2016-01-25T10:00:00Z"]));
    assert_eq!(out["start"], "2016-01-25T09:00:00Z");
    assert_eq!(out["end"], "2016-01-25T10:00:00Z");
}

#[test]
fn test_schedule_zone_shows_in_output() {
    let path = write_schedule(
        "tokyo",
        r#"{ "timezone": "Asia/Tokyo", "windows": [{ "start": "09:00", "end": "17:00" }] }"#,
    );
    let out = json_output(bizhours().arg("--config").arg(&path).args([
        "next",
        "--at",
        "2026-06-15T00:00:00Z",
    ]));
    fs::remove_file(&path).ok();

    assert_eq!(out["start"], "2026-06-15T09:00:00+09:00");
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[test]
fn test_bad_instant_fails() {
    bizhours()
        .args(["next", "--at", "next tuesday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad instant"));
}

#[test]
fn test_bad_duration_fails() {
    bizhours()
        .args(["add", "--from", "2016-01-18T09:00:00Z", "--duration", "8 parsecs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn test_invalid_schedule_fails() {
    let path = write_schedule("invalid", r#"{ "timezone": "Mars/Olympus" }"#);
    let assert = bizhours()
        .arg("--config")
        .arg(&path)
        .args(["next", "--at", "2016-01-18T09:00:00Z"])
        .assert();
    fs::remove_file(&path).ok();

    assert
        .failure()
        .stderr(predicate::str::contains("invalid schedule"));
}

#[test]
fn test_missing_schedule_file_fails() {
    bizhours()
        .args(["--config", "/nonexistent/bizhours.json"])
        .args(["next", "--at", "2016-01-18T09:00:00Z"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read schedule"));
}
