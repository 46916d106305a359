use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use tempfile::tempdir;

#[allow(deprecated)]
fn agg_build() -> Command {
    Command::cargo_bin("agg-build").expect("binary")
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn build_reads_json_file() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("rule.json");
    fs::write(
        &path,
        r#"{
            "timeSeries": { "timeField": "@timestamp", "timeWindowSize": 5, "timeWindowUnit": "m" },
            "aggType": "max",
            "aggField": "cpu",
            "termField": "host.name"
        }"#,
    )
    .unwrap();

    let output = agg_build()
        .arg("build")
        .arg("--config")
        .arg(&path)
        .arg("--now")
        .arg("2024-01-01T00:05:00Z")
        .output()
        .expect("command run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let body = stdout_json(&output);
    assert_eq!(body["groupAgg"]["terms"]["order"], json!({ "sortValueAgg": "desc" }));
    assert_eq!(
        body["groupAgg"]["aggs"]["dateAgg"]["date_range"]["ranges"],
        json!([{ "from": "2024-01-01T00:00:00.000Z", "to": "2024-01-01T00:05:00.000Z" }])
    );
    assert_eq!(
        body["groupAgg"]["aggs"]["dateAgg"]["aggs"]["metricAgg"],
        json!({ "max": { "field": "cpu" } })
    );
}

#[test]
fn build_reads_toml_file() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("rule.toml");
    fs::write(
        &path,
        r#"
aggType = "count"
termField = ["host.name", "service.name"]
termSize = 5

[condition]
resultLimit = 3
conditionScript = "params.compareValue > 10"
"#,
    )
    .unwrap();

    let output = agg_build()
        .args(["build", "--compact", "--config"])
        .arg(&path)
        .output()
        .expect("command run");

    assert!(output.status.success());
    let body = stdout_json(&output);
    assert_eq!(body["groupAgg"]["multi_terms"]["size"], json!(4));
    assert_eq!(
        body["groupAgg"]["aggs"]["conditionSelector"]["bucket_selector"]["buckets_path"],
        json!({ "compareValue": "_count" })
    );
}

#[test]
fn build_reads_stdin() {
    let output = agg_build()
        .arg("build")
        .write_stdin(r#"{ "aggType": "average", "aggField": "latency" }"#)
        .output()
        .expect("command run");

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!({ "metricAgg": { "avg": { "field": "latency" } } })
    );
}

#[test]
fn clamped_top_hits_is_logged() {
    agg_build()
        .arg("build")
        .write_stdin(r#"{ "aggType": "count", "termField": "host.name", "topHitsSize": 150 }"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"size\": 100"))
        .stderr(predicate::str::contains("capped at 100"));
}

#[test]
fn invalid_window_fails() {
    agg_build()
        .arg("build")
        .write_stdin(
            r#"{
                "timeSeries": { "timeField": "@timestamp", "timeWindowSize": 0, "timeWindowUnit": "m" },
                "aggType": "count"
            }"#,
        )
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time window"));
}

#[test]
fn unknown_option_fails() {
    agg_build()
        .arg("build")
        .write_stdin(r#"{ "aggType": "count", "groupField": "host.name" }"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("groupField"));
}

#[test]
fn ranges_subdivides_window() {
    let output = agg_build()
        .args([
            "ranges",
            "--window",
            "10m",
            "--interval",
            "5m",
            "--now",
            "2024-01-01T01:00:00Z",
            "--quiet",
        ])
        .output()
        .expect("command run");

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!({
            "dateStart": "2024-01-01T00:50:00.000Z",
            "dateEnd": "2024-01-01T01:00:00.000Z",
            "dateRanges": [
                { "from": "2024-01-01T00:50:00.000Z", "to": "2024-01-01T00:55:00.000Z" },
                { "from": "2024-01-01T00:55:00.000Z", "to": "2024-01-01T01:00:00.000Z" }
            ]
        })
    );
}

#[test]
fn ranges_rejects_unknown_unit() {
    agg_build()
        .args(["ranges", "--window", "5y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --window"));
}
