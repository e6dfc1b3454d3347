use assert_cmd::Command;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

fn write_config(dir: &tempfile::TempDir, extra: &str) -> PathBuf {
    let toml = format!(
        r#"
default_line = "L"

[timing]
poll_ms = 50
fetch_interval_s = 1
sync_interval_s = 1

{extra}
"#
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn trainsign(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("trainsign").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("TRAINSIGN_SIM_FAIL")
        .arg("--config")
        .arg(cfg);
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["lines"], 0, "G29", "stdout")]
#[case(&["--simulate", "once"], 0, "Manhattan", "stdout")]
#[case(&["--simulate", "once", "--line", "G"], 0, "Church Av", "stdout")]
#[case(&["--simulate", "once", "--line", "Z"], 3, "not configured", "stderr")]
#[case(&["--simulate", "self-check"], 0, "OK", "stdout")]
#[case(&["--simulate", "run", "--max-iterations", "3"], 0, "Canarsie", "stdout")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let mut cmd = trainsign(&cfg);
    for a in args {
        cmd.arg(a);
    }
    let assert = cmd.timeout(Duration::from_secs(30)).assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn invalid_config_exits_2() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[timing]\npoll_ms = 0\n").unwrap();
    trainsign(&path)
        .arg("lines")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("poll_ms"));
}

#[test]
fn explicit_missing_config_exits_2() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.toml");
    trainsign(&path).arg("lines").assert().code(2);
}

#[test]
fn json_once_reports_both_rows() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let out = trainsign(&cfg)
        .args(["--simulate", "--json", "once", "--line", "G"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["stop_id"], "G29");
    assert_eq!(v["north"]["label"], "Queens");
    assert_eq!(v["north"]["arrivals"].as_array().unwrap().len(), 3);
    assert_eq!(v["south"]["arrivals"].as_array().unwrap().len(), 3);
}

#[test]
fn json_lines_lists_registry() {
    let dir = tempdir().unwrap();
    let cfg = write_config(
        &dir,
        r#"
[[lines]]
id = "7"
stop_id = "724"
station = "7-5 Av"
north = "Flushing"
south = "Hudson Yards"
logo = "7-dashboard.bmp"
"#,
    );
    // A custom registry replaces the built-in lines, so the defaults must follow.
    let text = fs::read_to_string(&cfg)
        .unwrap()
        .replace("default_line = \"L\"", "default_line = \"7\"")
        + "\n[buttons]\nup = \"7\"\ndown = \"7\"\n";
    fs::write(&cfg, text).unwrap();

    let out = trainsign(&cfg).args(["--json", "lines"]).output().unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["stop_id"], "724");
    assert_eq!(arr[0]["default"], true);
}

#[test]
fn feed_outage_ends_in_device_reset() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[resilience]\nerror_reset_threshold = 1\nsettle_ms = 0\n");
    trainsign(&cfg)
        .env("TRAINSIGN_SIM_FAIL", "1")
        .args(["--simulate", "run"])
        .timeout(Duration::from_secs(30))
        .assert()
        .code(75);
}

#[test]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let out = trainsign(&cfg)
        .args(["--simulate", "--json", "once", "--line", "Q"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&out.stderr);
    let line = stderr
        .lines()
        .rev()
        .find(|l| l.contains("\"reason\""))
        .unwrap();
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["reason"], "UnknownLine");
}

#[test]
fn device_reset_flushes_file_log() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("sign.log");
    let cfg = write_config(
        &dir,
        &format!(
            "[resilience]\nerror_reset_threshold = 1\nsettle_ms = 0\n\n[logging]\nfile = '{}'\nrotation = \"never\"\n",
            log.display()
        ),
    );
    trainsign(&cfg)
        .env("TRAINSIGN_SIM_FAIL", "1")
        .args(["--simulate", "run"])
        .timeout(Duration::from_secs(30))
        .assert()
        .code(75);
    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("refresh failed"), "{text}");
    assert!(text.contains("device reset: exiting"), "{text}");
}
