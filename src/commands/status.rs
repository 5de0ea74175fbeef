use crate::commands::CommandReport;
use crate::vault::cursor;
use crate::vault::paths::{VaultPaths, resolve_paths};
use crate::vault::registry::{self, VideoStatus};
use anyhow::Result;
use std::collections::BTreeSet;
use std::env;
use std::fs;

include!(concat!(env!("OUT_DIR"), "/chatvault_env_allowlist.rs"));

fn count_transcripts(paths: &VaultPaths) -> Result<usize> {
    if !paths.transcripts_dir.exists() {
        return Ok(0);
    }
    let mut count = 0usize;
    for channel_entry in fs::read_dir(&paths.transcripts_dir)? {
        let channel_dir = channel_entry?.path();
        if !channel_dir.is_dir() {
            continue;
        }
        for entry in fs::read_dir(&channel_dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                count += 1;
            }
        }
    }
    Ok(count)
}

/// Read-only snapshot of every durable store plus the recognized environment
/// overrides currently in effect.
pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("status");

    report.detail(format!("data_dir={}", paths.data_dir.display()));
    report.detail(format!("registry={}", paths.registry_file.display()));
    report.detail(format!("cursor_store={}", paths.cursor_file.display()));
    report.detail(format!("transcripts_dir={}", paths.transcripts_dir.display()));

    let entries = registry::load(&paths)?;
    report.detail(format!("videos_total={}", entries.len()));
    for status in [VideoStatus::Upcoming, VideoStatus::Live, VideoStatus::Ended] {
        let count = entries.iter().filter(|e| e.status == status).count();
        report.detail(format!("videos_{}={count}", status.as_str()));
    }
    report.detail(format!(
        "chat_pending={}",
        entries.iter().filter(|e| !e.chat_fetched).count()
    ));
    report.detail(format!(
        "chat_done={}",
        entries.iter().filter(|e| e.chat_fetched).count()
    ));

    let cursors = cursor::load(&paths)?;
    report.detail(format!("cursor_entries={}", cursors.len()));
    report.detail(format!(
        "cursor_terminal={}",
        cursors.values().filter(|c| c.session_id.is_none()).count()
    ));
    report.detail(format!(
        "cursor_resumable={}",
        cursors
            .values()
            .filter(|c| c.continuation_token.as_deref().is_some_and(|t| !t.is_empty()))
            .count()
    ));
    report.detail(format!("transcripts={}", count_transcripts(&paths)?));

    let known: BTreeSet<&str> = entries.iter().map(|e| e.video_id.as_str()).collect();
    let orphaned = cursors
        .keys()
        .filter(|id| !known.contains(id.as_str()))
        .count();
    if orphaned > 0 {
        report.issue(format!(
            "{orphaned} cursor entries reference videos missing from the registry"
        ));
    }

    for key in GENERATED_ENV_ALLOWLIST {
        if env::var_os(key).is_some() {
            report.detail(format!("env_set={key}"));
        }
    }

    Ok(report)
}
