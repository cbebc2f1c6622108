//! Integration tests for the tripcache binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"
cache:
  backend: disk
  ttl: 1h
providers:
  - name: CP
    transport: train
    fixture: data/cp.json
    stations:
      - { code: LIS, lat: 38.7139, lng: -9.1228 }
      - { code: OPO, lat: 41.1486, lng: -8.5853 }
  - name: Atlantico
    transport: car
    fixture: data/atlantico.json
    stations:
      - { code: FNC, lat: 32.65, lng: -16.91 }
      - { code: PXO, lat: 33.06, lng: -16.34 }
"#;

const CP_TRIPS: &str = r#"[
  {
    "provider": "CP",
    "transport": "train",
    "origin": "LIS",
    "destination": "OPO",
    "departure": "2025-05-01 10:00:00",
    "arrival": "2025-05-01 12:45:00",
    "price": 31.2,
    "currency": "EUR",
    "train_number": "AP 131"
  },
  {
    "provider": "CP",
    "transport": "train",
    "origin": "LIS",
    "destination": "OPO",
    "departure": "2025-05-02 10:00:00",
    "arrival": "2025-05-02 12:45:00"
  }
]"#;

fn setup_project(config: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join(".tripcache");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.yml"), config).unwrap();

    let data = temp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("cp.json"), CP_TRIPS).unwrap();
    fs::write(data.join("atlantico.json"), "[]").unwrap();
    temp
}

fn search_args() -> [&'static str; 9] {
    [
        "search",
        "--from",
        "38.72,-9.14",
        "--to",
        "41.15,-8.61",
        "--departure",
        "2025-05-01",
        "--arrival",
        "2025-05-01",
    ]
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("tripcache"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("search").and(predicate::str::contains("cache")));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("tripcache"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_search_prints_trips() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(CONFIG);
    let mut cmd = Command::new(cargo_bin("tripcache"));
    cmd.current_dir(temp.path());
    cmd.args(search_args());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1 trips"))
        .stdout(predicate::str::contains("31.20 EUR"))
        .stdout(predicate::str::contains("Atlantico has no station"));
    Ok(())
}

#[test]
fn cli_search_json_output() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(CONFIG);
    let mut cmd = Command::new(cargo_bin("tripcache"));
    cmd.current_dir(temp.path());
    cmd.args(search_args()).arg("--json");
    let output = cmd.assert().success().get_output().stdout.clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output)?;
    assert_eq!(parsed["trips"].as_array().unwrap().len(), 1);
    assert_eq!(parsed["trips"][0]["train_number"], "AP 131");
    assert_eq!(parsed["skipped"][0], "Atlantico");
    Ok(())
}

#[test]
fn cli_search_writes_disk_cache() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(CONFIG);
    Command::new(cargo_bin("tripcache"))
        .current_dir(temp.path())
        .args(search_args())
        .assert()
        .success();

    let mut cmd = Command::new(cargo_bin("tripcache"));
    cmd.current_dir(temp.path());
    cmd.args(["cache", "stats"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Total entries: 2"))
        .stdout(predicate::str::contains("Window indexes: 1"));
    Ok(())
}

#[test]
fn cli_cache_clear_empties_store() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(CONFIG);
    Command::new(cargo_bin("tripcache"))
        .current_dir(temp.path())
        .args(search_args())
        .assert()
        .success();

    Command::new(cargo_bin("tripcache"))
        .current_dir(temp.path())
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 entries"));

    Command::new(cargo_bin("tripcache"))
        .current_dir(temp.path())
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache is empty"));
    Ok(())
}

#[test]
fn cli_search_without_cache_leaves_no_entries() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&CONFIG.replace("ttl: 1h", "ttl: 1h\n  enabled: false"));
    Command::new(cargo_bin("tripcache"))
        .current_dir(temp.path())
        .args(search_args())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 trips"));

    Command::new(cargo_bin("tripcache"))
        .current_dir(temp.path())
        .args(["cache", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total entries: 0"));
    Ok(())
}

#[test]
fn cli_search_no_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = Command::new(cargo_bin("tripcache"));
    cmd.current_dir(temp.path());
    cmd.args(search_args());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Configuration not found"));
    Ok(())
}

#[test]
fn cli_search_rejects_bad_coordinates() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(CONFIG);
    let mut cmd = Command::new(cargo_bin("tripcache"));
    cmd.current_dir(temp.path());
    cmd.args(["search", "--from", "nowhere", "--to", "41.15,-8.61"]);
    cmd.args(["--departure", "2025-05-01", "--arrival", "2025-05-01"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("LAT,LNG"));
    Ok(())
}

#[test]
fn cli_search_rejects_reversed_window() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(CONFIG);
    let mut cmd = Command::new(cargo_bin("tripcache"));
    cmd.current_dir(temp.path());
    cmd.args(["search", "--from", "38.72,-9.14", "--to", "41.15,-8.61"]);
    cmd.args(["--departure", "2025-05-02", "--arrival", "2025-05-01"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time window"));
    Ok(())
}

#[test]
fn cli_project_flag_overrides_cwd() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(CONFIG);
    let elsewhere = TempDir::new()?;
    let mut cmd = Command::new(cargo_bin("tripcache"));
    cmd.current_dir(elsewhere.path());
    cmd.arg("--project").arg(temp.path());
    cmd.args(search_args());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1 trips"));
    Ok(())
}
