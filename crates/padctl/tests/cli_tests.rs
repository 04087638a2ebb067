//! End-to-end tests for the offline padctl commands.
//!
//! `decode` and `encode` never touch the HID stack, so these run without a
//! controller attached.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn padctl() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("padctl")?;
    cmd.env_remove("PADCTL_CONFIG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    Ok(cmd)
}

/// Wired report with the left stick pushed right, cross held and the dpad
/// released.
fn wired_report_hex() -> Vec<String> {
    let mut report = vec![0u8; 64];
    report[0] = 0x01;
    report[1] = 0xFF;
    report[2] = 0x7F;
    report[3] = 0x80;
    report[4] = 0x7F;
    report[8] = 0x28;
    report.iter().map(|b| format!("{b:02x}")).collect()
}

fn stdout_json(output: &std::process::Output) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_slice(&output.stdout)?)
}

#[test]
fn decode_wired_report_json() -> TestResult {
    let output = padctl()?
        .args(["--json", "decode", "--transport", "wired"])
        .args(wired_report_hex())
        .output()?;
    assert!(output.status.success());

    let json = stdout_json(&output)?;
    assert_eq!(json["success"], true);
    assert_eq!(json["transport"], "wired");
    assert_eq!(json["state"]["left_stick"]["x"], 127);
    assert_eq!(json["state"]["left_stick"]["y"], 0);
    assert_eq!(json["state"]["buttons"]["cross"], true);
    assert_eq!(json["state"]["dpad"]["up"], false);
    Ok(())
}

#[test]
fn decode_wired_report_human() -> TestResult {
    padctl()?
        .args(["decode", "-t", "wired", &wired_report_hex().concat()])
        .assert()
        .success()
        .stdout(predicate::str::contains("L=( 127,   0)"))
        .stdout(predicate::str::contains("buttons=[cross]"));
    Ok(())
}

#[test]
fn decode_rejects_report_for_other_transport() -> TestResult {
    padctl()?
        .args(["decode", "--transport", "wireless"])
        .args(wired_report_hex())
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Invalid input"));
    Ok(())
}

#[test]
fn decode_rejects_malformed_hex() -> TestResult {
    let output = padctl()?
        .args(["--json", "decode", "-t", "wired", "01", "zz"])
        .output()?;
    assert_eq!(output.status.code(), Some(4));

    let json = stdout_json(&output)?;
    assert_eq!(json["success"], false);
    Ok(())
}

#[test]
fn encode_default_wired() -> TestResult {
    let output = padctl()?
        .args(["--json", "encode", "--transport", "wired"])
        .output()?;
    assert!(output.status.success());

    let json = stdout_json(&output)?;
    assert_eq!(json["length"], 48);
    let bytes = json["bytes"].as_str().ok_or("bytes missing")?;
    assert!(bytes.starts_with("02 FF F7 00 00"), "{bytes}");
    Ok(())
}

#[test]
fn encode_state_file_over_bluetooth() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("rumble.json");
    fs::write(
        &path,
        r#"{"left_rumble": 64, "right_rumble": 128, "lightbar": {"r": 0, "g": 0, "b": 255}}"#,
    )?;

    let output = padctl()?
        .args(["--json", "encode", "-t", "bluetooth", "--state"])
        .arg(&path)
        .output()?;
    assert!(output.status.success());

    let json = stdout_json(&output)?;
    assert_eq!(json["transport"], "wireless_radio");
    assert_eq!(json["length"], 547);
    let bytes = json["bytes"].as_str().ok_or("bytes missing")?;
    assert!(bytes.starts_with("31 02 FF F7 80 40"), "{bytes}");
    Ok(())
}

#[test]
fn encode_human_prints_offset_rows() -> TestResult {
    padctl()?
        .args(["encode", "-t", "wired"])
        .assert()
        .success()
        .stdout(predicate::str::contains("USB output report"))
        .stdout(predicate::str::contains("0000  02 FF F7"))
        .stdout(predicate::str::contains("0020  "));
    Ok(())
}

#[test]
fn encode_rejects_unparseable_state() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"{"left_rumble": "loud"}"#)?;

    padctl()?
        .args(["encode", "-t", "wired", "--state"])
        .arg(&path)
        .assert()
        .code(4);
    Ok(())
}

#[test]
fn invalid_config_is_reported() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("padctl.json");
    fs::write(&path, r#"{"event_capacity": 0}"#)?;

    padctl()?
        .args(["decode", "-t", "wired", "--config"])
        .arg(&path)
        .args(wired_report_hex())
        .assert()
        .code(4)
        .stderr(predicate::str::contains("event_capacity"));
    Ok(())
}

#[test]
fn help_lists_commands() -> TestResult {
    padctl()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("monitor"))
        .stdout(predicate::str::contains("decode"))
        .stdout(predicate::str::contains("apply"));
    Ok(())
}
