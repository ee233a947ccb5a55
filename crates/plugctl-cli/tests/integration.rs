#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const OVERRIDE_VARS: &[&str] = &[
    "PLUGCTL_CONFIG",
    "KASA_DIR",
    "SYSTEM_NAME",
    "SERVER_PORT",
    "LOG_DIRECTORY",
    "EMAIL_FROM",
    "EMAIL_PASSWORD",
    "EMAIL_TO",
    "SMTP_HOST",
    "SMTP_PORT",
    "PLUGCTL_COMMAND_TIMEOUT_SECS",
];

fn plugctl(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("plugctl").unwrap();
    cmd.current_dir(dir.path());
    for var in OVERRIDE_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn write_config(dir: &TempDir, body: &str) {
    std::fs::write(dir.path().join("config.yaml"), body).unwrap();
}

fn read_info_log(dir: &TempDir) -> String {
    let logs = dir.path().join("logs");
    let mut out = String::new();
    for entry in std::fs::read_dir(&logs).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        if name.starts_with("info-") {
            out.push_str(&std::fs::read_to_string(&path).unwrap());
        }
    }
    out
}

/// Install a fake `kasa` under `<dir>/bin` that records each invocation and
/// remembers the last state it was told to switch to.
#[cfg(unix)]
fn install_fake_kasa(dir: &TempDir, script_body: &str) {
    use std::os::unix::fs::PermissionsExt;

    let bin = dir.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    let path = bin.join("kasa");
    std::fs::write(&path, format!("#!/bin/sh\n{script_body}")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
const WORKING_PLUG: &str = r#"here=$(dirname "$0")
echo "$@" >> "$here/calls"
case "$4" in
  on) echo "Device state: ON" > "$here/state" ;;
  off) echo "Device state: OFF" > "$here/state" ;;
  state) cat "$here/state" 2>/dev/null || echo "Device state: OFF" ;;
esac
"#;

fn recorded_calls(dir: &Path) -> Vec<String> {
    match std::fs::read_to_string(dir.join("bin/calls")) {
        Ok(s) => s.lines().map(str::to_string).collect(),
        Err(_) => Vec::new(),
    }
}

const DEVICES: &str = r#"
kasa_dir: bin
command_timeout_secs: 5
logging:
  directory: logs
devices:
  plugs:
    - id: heater
      ip_addr: 10.0.0.5
  sensors:
    - id: s1
      corresponding_plug_ip: 10.0.0.5
    - id: basement
      corresponding_plug_ip: 10.0.0.7
"#;

// ---------------------------------------------------------------------------
// plugctl config validate
// ---------------------------------------------------------------------------

#[test]
fn validate_reports_errors_and_fails() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        "command_timeout_secs: 0\ndevices:\n  sensors:\n    - id: s1\n      corresponding_plug_ip: ''\n",
    );

    plugctl(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error] command_timeout_secs"))
        .stderr(predicate::str::contains("config validation found errors"));
}

#[test]
fn validate_warnings_do_not_fail() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, DEVICES);

    plugctl(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[warning]"))
        .stdout(predicate::str::contains("10.0.0.7"));
}

#[test]
fn missing_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    plugctl(&dir)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.yaml"));
}

// ---------------------------------------------------------------------------
// plugctl config show
// ---------------------------------------------------------------------------

#[test]
fn show_lists_sensor_mapping() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, DEVICES);

    plugctl(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SENSOR"))
        .stdout(predicate::str::contains("basement  10.0.0.7"))
        .stdout(predicate::str::contains("s1        10.0.0.5"));
}

#[test]
fn show_json_applies_env_overrides() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, DEVICES);

    let out = plugctl(&dir)
        .args(["config", "show", "--json"])
        .env("SYSTEM_NAME", "greenhouse")
        .output()
        .unwrap();
    assert!(out.status.success());

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["system_name"], "greenhouse");
    assert_eq!(v["sensors"].as_array().unwrap().len(), 2);
    assert_eq!(v["sensors"][0]["sensor_id"], "basement");
}

#[test]
fn explicit_config_path_is_honored() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("plugs.yaml"), DEVICES).unwrap();

    plugctl(&dir)
        .args(["--config", "plugs.yaml", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("basement"));
}

// ---------------------------------------------------------------------------
// plugctl actuate
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn actuate_confirms_and_logs() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, DEVICES);
    install_fake_kasa(&dir, WORKING_PLUG);

    plugctl(&dir)
        .args(["actuate", "s1", "on", "--temp-c", "21.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[s1] plug confirmed on"));

    assert_eq!(
        recorded_calls(dir.path()),
        vec![
            "--host 10.0.0.5 --plug on".to_string(),
            "--host 10.0.0.5 --plug state".to_string(),
        ]
    );
    let log = read_info_log(&dir);
    assert!(log.contains(
        "[s1] Successfully fulfilled request to turn on corresponding plug. Temp: 21.50 C / 70.70 F"
    ));
}

#[cfg(unix)]
#[test]
fn actuate_reports_validation_failure() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, DEVICES);
    // Accepts every command but never changes state.
    install_fake_kasa(
        &dir,
        "echo \"$@\" >> \"$(dirname \"$0\")/calls\"\n[ \"$4\" = state ] && echo 'Device state: OFF'\nexit 0\n",
    );

    let out = plugctl(&dir)
        .args(["actuate", "s1", "on", "--json"])
        .output()
        .unwrap();
    assert!(!out.status.success());

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["outcome"]["kind"], "validation_failed");
    assert_eq!(recorded_calls(dir.path()).len(), 2);

    let log = read_info_log(&dir);
    assert!(log.contains("Failed request to turn on corresponding plug (validation_failed)"));
    assert!(log.contains("Critical message from plugctl"));
}

#[cfg(unix)]
#[test]
fn actuate_set_failure_skips_query() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, DEVICES);
    install_fake_kasa(
        &dir,
        "echo \"$@\" >> \"$(dirname \"$0\")/calls\"\necho 'Unable to connect' >&2\nexit 1\n",
    );

    plugctl(&dir)
        .args(["actuate", "s1", "off"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("command_failed"));

    assert_eq!(
        recorded_calls(dir.path()),
        vec!["--host 10.0.0.5 --plug off".to_string()]
    );
}

#[cfg(unix)]
#[test]
fn actuate_unknown_sensor_invokes_nothing() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, DEVICES);
    install_fake_kasa(&dir, WORKING_PLUG);

    plugctl(&dir)
        .args(["actuate", "attic", "on"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown_sensor"));

    assert!(recorded_calls(dir.path()).is_empty());
}

#[cfg(unix)]
#[test]
fn actuate_refuses_zero_timeout() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, &DEVICES.replace("command_timeout_secs: 5", "command_timeout_secs: 0"));
    install_fake_kasa(&dir, WORKING_PLUG);

    plugctl(&dir)
        .args(["actuate", "s1", "on"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("command_timeout_secs must be greater than zero"));

    assert!(recorded_calls(dir.path()).is_empty());
    assert!(!dir.path().join("logs").exists());
}

#[test]
fn actuate_rejects_bad_state() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, DEVICES);

    plugctl(&dir)
        .args(["actuate", "s1", "toggle"])
        .assert()
        .failure();
    assert!(!dir.path().join("logs").exists());
}
