use std::fs;
use std::process::Command;

use serde_json::Value;
use tempfile::tempdir;

fn cake_sim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cake-sim"))
}

#[test]
fn sample_divide_check_round_trip() {
    let dir = tempdir().unwrap();
    let request = dir.path().join("request.json");
    let response = dir.path().join("response.json");
    let config = dir.path().join("config.yaml");
    fs::write(&config, "epsilon: 0.05\n").unwrap();

    let status = cake_sim()
        .args(["sample", "--agents", "3", "--cake-size", "4", "--seed", "11", "--out"])
        .arg(&request)
        .status()
        .unwrap();
    assert!(status.success());

    let status = cake_sim()
        .args(["divide", "--input"])
        .arg(&request)
        .arg("--config")
        .arg(&config)
        .arg("--out")
        .arg(&response)
        .status()
        .unwrap();
    assert!(status.success());
    let parsed: Value = serde_json::from_str(&fs::read_to_string(&response).unwrap()).unwrap();
    assert_eq!(parsed["division"].as_array().unwrap().len(), 2);
    assert_eq!(parsed["provenance"]["epsilon"], 0.05);

    let output = cake_sim()
        .args(["check", "--input"])
        .arg(&request)
        .arg("--response")
        .arg(&response)
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["agents"].as_array().unwrap().len(), 3);
}

#[test]
fn invalid_requests_fail_with_a_nonzero_status() {
    let dir = tempdir().unwrap();
    let request = dir.path().join("request.json");
    fs::write(
        &request,
        r#"{"cake_size": 1.0, "preferences": [[{"start": 0.0, "end": 1.0, "start_value": 1.0, "end_value": 1.0}]]}"#,
    )
    .unwrap();
    let output = cake_sim().args(["divide", "--input"]).arg(&request).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("agent-count"));
}
