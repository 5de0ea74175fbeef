use crate::vault::paths::VaultPaths;
use crate::vault::warn::{self, WarnEvent};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Lifecycle state reported by upstream. Transitions only move forward;
/// a stale upstream snapshot can never regress an `Ended` entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    #[default]
    Upcoming,
    Live,
    Ended,
}

impl VideoStatus {
    fn rank(self) -> u8 {
        match self {
            Self::Upcoming => 0,
            Self::Live => 1,
            Self::Ended => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Live => "live",
            Self::Ended => "ended",
        }
    }
}

/// One archival-eligible stream. Entries are appended and updated, never
/// deleted. `chat_fetched` is owned by the archiver; discovery must not touch
/// it once the entry exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoEntry {
    pub video_id: String,
    pub channel_key: String,
    pub channel_name: String,
    pub title: String,
    pub published_at: String,
    pub status: VideoStatus,
    pub chat_fetched: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UpsertOutcome {
    pub inserted: usize,
    pub updated: usize,
}

pub fn registry_path(paths: &VaultPaths) -> PathBuf {
    paths.registry_file.clone()
}

/// Load the registry. A missing file is an empty registry; an unreadable or
/// corrupt file is recovered as empty (the stores are reconstructable, and
/// discovery re-fills it on the next pass).
pub fn load(paths: &VaultPaths) -> Result<Vec<VideoEntry>> {
    let file = registry_path(paths);
    if !file.exists() {
        return Ok(Vec::new());
    }

    let raw =
        fs::read_to_string(&file).with_context(|| format!("failed to read {}", file.display()))?;
    match serde_json::from_str(&raw) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            warn::emit(WarnEvent {
                code: "REGISTRY_CORRUPT",
                stage: "registry-load",
                channel: "",
                video: "",
                reason: "treating-as-empty",
                err: &err.to_string(),
            });
            Ok(Vec::new())
        }
    }
}

pub fn save(paths: &VaultPaths, entries: &[VideoEntry]) -> Result<PathBuf> {
    let file = registry_path(paths);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let data = serde_json::to_string_pretty(entries)?;
    fs::write(&file, format!("{data}\n"))
        .with_context(|| format!("failed to write {}", file.display()))?;
    Ok(file)
}

/// Merge freshly discovered entries into the registry.
///
/// New video ids are inserted as-is (discovery sets `chat_fetched = false`).
/// Existing ids get their descriptive fields and status refreshed, with two
/// guards: `chat_fetched` is preserved bit-for-bit, and `status` never moves
/// backwards.
pub fn upsert(entries: &mut Vec<VideoEntry>, incoming: Vec<VideoEntry>) -> UpsertOutcome {
    let mut outcome = UpsertOutcome::default();
    for fresh in incoming {
        match entries.iter_mut().find(|e| e.video_id == fresh.video_id) {
            Some(existing) => {
                existing.channel_name = fresh.channel_name;
                existing.title = fresh.title;
                existing.published_at = fresh.published_at;
                if fresh.status.rank() > existing.status.rank() {
                    existing.status = fresh.status;
                }
                outcome.updated += 1;
            }
            None => {
                entries.push(fresh);
                outcome.inserted += 1;
            }
        }
    }
    outcome
}

/// Registry order: ascending publish time, ties kept in discovery order.
pub fn sort_by_published_at(entries: &mut [VideoEntry]) {
    entries.sort_by(|a, b| a.published_at.cmp(&b.published_at));
}
