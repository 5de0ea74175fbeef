use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_config(dir: &Path) -> std::path::PathBuf {
    let config_path = dir.join("channels.toml");
    fs::write(
        &config_path,
        r#"
[[channels]]
key = "main"
channel_id = "UC0000000000000000000000"
name = "Main Channel"
"#,
    )
    .expect("write config");
    config_path
}

#[test]
fn archive_without_registry_is_fatal() {
    let tmp = tempdir().expect("tempdir");
    let data_dir = tmp.path().join("vault");
    let config_path = write_config(tmp.path());

    assert_cmd::cargo::cargo_bin_cmd!("chatvault")
        .current_dir(tmp.path())
        .env("CHATVAULT_DATA_DIR", &data_dir)
        .env("CHATVAULT_CONFIG_PATH", &config_path)
        .env("CHATVAULT_API_KEY", "test-key")
        .args(["archive", "--mode", "ended"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("video registry unavailable"));
}

#[test]
fn archive_with_no_candidates_makes_no_upstream_calls() {
    let tmp = tempdir().expect("tempdir");
    let data_dir = tmp.path().join("vault");
    let config_path = write_config(tmp.path());

    fs::create_dir_all(&data_dir).expect("mkdir");
    fs::write(
        data_dir.join("videos.json"),
        r#"[
  {
    "videoId": "v1",
    "channelKey": "main",
    "channelName": "Main",
    "title": "already archived",
    "publishedAt": "2026-01-01T00:00:00Z",
    "status": "ended",
    "chatFetched": true
  }
]
"#,
    )
    .expect("write registry");

    // base_url points nowhere; with zero candidates the run must still
    // succeed without touching the network
    assert_cmd::cargo::cargo_bin_cmd!("chatvault")
        .current_dir(tmp.path())
        .env("CHATVAULT_DATA_DIR", &data_dir)
        .env("CHATVAULT_CONFIG_PATH", &config_path)
        .env("CHATVAULT_API_KEY", "test-key")
        .env("CHATVAULT_API_BASE_URL", "http://127.0.0.1:9")
        .args(["archive", "--mode", "ended"])
        .assert()
        .success()
        .stdout(predicate::str::contains("candidates=0"))
        .stdout(predicate::str::contains("attempted=0"));
}

#[test]
fn archive_without_credential_is_fatal() {
    let tmp = tempdir().expect("tempdir");
    let data_dir = tmp.path().join("vault");
    let config_path = write_config(tmp.path());

    fs::create_dir_all(&data_dir).expect("mkdir");
    fs::write(data_dir.join("videos.json"), "[]\n").expect("write registry");

    assert_cmd::cargo::cargo_bin_cmd!("chatvault")
        .current_dir(tmp.path())
        .env("CHATVAULT_DATA_DIR", &data_dir)
        .env("CHATVAULT_CONFIG_PATH", &config_path)
        .env_remove("CHATVAULT_API_KEY")
        .args(["archive", "--mode", "live"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("api credential missing"));
}
