use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn discover_without_channels_is_a_config_failure() {
    let tmp = tempdir().expect("tempdir");
    let data_dir = tmp.path().join("vault");
    let config_path = tmp.path().join("channels.toml");
    fs::write(&config_path, "# no channels\n").expect("write config");

    assert_cmd::cargo::cargo_bin_cmd!("chatvault")
        .current_dir(tmp.path())
        .env("CHATVAULT_DATA_DIR", &data_dir)
        .env("CHATVAULT_CONFIG_PATH", &config_path)
        .env("CHATVAULT_API_KEY", "test-key")
        .arg("discover")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no channels configured"));
}

#[test]
fn discover_with_malformed_config_is_fatal() {
    let tmp = tempdir().expect("tempdir");
    let data_dir = tmp.path().join("vault");
    let config_path = tmp.path().join("channels.toml");
    fs::write(&config_path, "channels = \"not a table\"\n").expect("write config");

    assert_cmd::cargo::cargo_bin_cmd!("chatvault")
        .current_dir(tmp.path())
        .env("CHATVAULT_DATA_DIR", &data_dir)
        .env("CHATVAULT_CONFIG_PATH", &config_path)
        .arg("discover")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file invalid"));
}

#[test]
fn discover_without_credential_is_fatal() {
    let tmp = tempdir().expect("tempdir");
    let data_dir = tmp.path().join("vault");
    let config_path = tmp.path().join("channels.toml");
    fs::write(
        &config_path,
        r#"
[[channels]]
key = "main"
channel_id = "UC0000000000000000000000"
"#,
    )
    .expect("write config");

    assert_cmd::cargo::cargo_bin_cmd!("chatvault")
        .current_dir(tmp.path())
        .env("CHATVAULT_DATA_DIR", &data_dir)
        .env("CHATVAULT_CONFIG_PATH", &config_path)
        .env_remove("CHATVAULT_API_KEY")
        .arg("discover")
        .assert()
        .failure()
        .stderr(predicate::str::contains("api credential missing"));
}

#[test]
fn unreachable_upstream_isolates_channels_and_still_writes_registry() {
    let tmp = tempdir().expect("tempdir");
    let data_dir = tmp.path().join("vault");
    let config_path = tmp.path().join("channels.toml");
    fs::write(
        &config_path,
        r#"
[[channels]]
key = "main"
channel_id = "UC0000000000000000000000"
"#,
    )
    .expect("write config");

    // every channel query fails fast against a closed port; the run is still
    // a success that archived nothing, and the registry file exists after
    assert_cmd::cargo::cargo_bin_cmd!("chatvault")
        .current_dir(tmp.path())
        .env("CHATVAULT_DATA_DIR", &data_dir)
        .env("CHATVAULT_CONFIG_PATH", &config_path)
        .env("CHATVAULT_API_KEY", "test-key")
        .env("CHATVAULT_API_BASE_URL", "http://127.0.0.1:9")
        .env("CHATVAULT_API_TIMEOUT_SECS", "2")
        .arg("discover")
        .assert()
        .success()
        .stdout(predicate::str::contains("channels_failed=1"))
        .stdout(predicate::str::contains("inserted=0"));

    assert!(data_dir.join("videos.json").exists());
    let raw = fs::read_to_string(data_dir.join("videos.json")).expect("read registry");
    assert_eq!(raw.trim(), "[]");
}
