use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn status_reports_empty_stores_on_cold_start() {
    let tmp = tempdir().expect("tempdir");
    let data_dir = tmp.path().join("vault");

    assert_cmd::cargo::cargo_bin_cmd!("chatvault")
        .current_dir(tmp.path())
        .env("CHATVAULT_DATA_DIR", &data_dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("videos_total=0"))
        .stdout(predicate::str::contains("chat_pending=0"))
        .stdout(predicate::str::contains("cursor_entries=0"))
        .stdout(predicate::str::contains("transcripts=0"));
}

#[test]
fn status_counts_seeded_state_files() {
    let tmp = tempdir().expect("tempdir");
    let data_dir = tmp.path().join("vault");
    fs::create_dir_all(data_dir.join("state")).expect("mkdir state");
    fs::create_dir_all(data_dir.join("transcripts/main")).expect("mkdir transcripts");

    fs::write(
        data_dir.join("videos.json"),
        r#"[
  {
    "videoId": "v1",
    "channelKey": "main",
    "channelName": "Main",
    "title": "first stream",
    "publishedAt": "2026-01-01T00:00:00Z",
    "status": "ended",
    "chatFetched": true
  },
  {
    "videoId": "v2",
    "channelKey": "main",
    "channelName": "Main",
    "title": "second stream",
    "publishedAt": "2026-01-02T00:00:00Z",
    "status": "live",
    "chatFetched": false
  }
]
"#,
    )
    .expect("write registry");

    fs::write(
        data_dir.join("state/chat_cursors.json"),
        r#"{
  "v1": {"sessionId": null, "continuationToken": null},
  "v2": {"sessionId": "chat-2", "continuationToken": "tok9"}
}
"#,
    )
    .expect("write cursors");

    fs::write(
        data_dir.join("transcripts/main/v1.json"),
        "{\"videoId\":\"v1\",\"messages\":[]}\n",
    )
    .expect("write transcript");

    assert_cmd::cargo::cargo_bin_cmd!("chatvault")
        .current_dir(tmp.path())
        .env("CHATVAULT_DATA_DIR", &data_dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("videos_total=2"))
        .stdout(predicate::str::contains("videos_live=1"))
        .stdout(predicate::str::contains("videos_ended=1"))
        .stdout(predicate::str::contains("chat_pending=1"))
        .stdout(predicate::str::contains("cursor_entries=2"))
        .stdout(predicate::str::contains("cursor_terminal=1"))
        .stdout(predicate::str::contains("cursor_resumable=1"))
        .stdout(predicate::str::contains("transcripts=1"));
}

#[test]
fn status_flags_cursor_entries_without_registry_entries() {
    let tmp = tempdir().expect("tempdir");
    let data_dir = tmp.path().join("vault");
    fs::create_dir_all(data_dir.join("state")).expect("mkdir state");

    fs::write(data_dir.join("videos.json"), "[]\n").expect("write registry");
    fs::write(
        data_dir.join("state/chat_cursors.json"),
        r#"{"ghost": {"sessionId": "chat-9", "continuationToken": "tok1"}}
"#,
    )
    .expect("write cursors");

    assert_cmd::cargo::cargo_bin_cmd!("chatvault")
        .current_dir(tmp.path())
        .env("CHATVAULT_DATA_DIR", &data_dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cursor entries reference videos"));
}

#[test]
fn status_emits_json_report_when_asked() {
    let tmp = tempdir().expect("tempdir");
    let data_dir = tmp.path().join("vault");

    assert_cmd::cargo::cargo_bin_cmd!("chatvault")
        .current_dir(tmp.path())
        .env("CHATVAULT_DATA_DIR", &data_dir)
        .arg("status")
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"command\": \"status\""))
        .stdout(predicate::str::contains("\"ok\": true"));
}
