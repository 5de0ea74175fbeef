use crate::vault::paths::VaultPaths;
use crate::vault::util::sanitize_file_stem;
use crate::vault::warn::{self, WarnEvent};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptMessage {
    /// Source-assigned publish time, ISO-8601; lexicographic order is
    /// chronological order.
    pub timestamp: String,
    /// Whole seconds from stream start, floored from the upstream
    /// millisecond offset.
    pub offset_seconds: i64,
    pub text: String,
    /// Upstream message category (chat/superchat/membership/…), passed
    /// through opaquely.
    pub kind: String,
}

/// One durable document per video. Always rewritten whole on merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptDocument {
    pub video_id: String,
    pub channel_key: String,
    pub channel_name: String,
    pub fetched_at: String,
    pub messages: Vec<TranscriptMessage>,
}

pub fn transcript_path(paths: &VaultPaths, channel_key: &str, video_id: &str) -> PathBuf {
    paths
        .transcripts_dir
        .join(sanitize_file_stem(channel_key))
        .join(format!("{}.json", sanitize_file_stem(video_id)))
}

/// Load a transcript document. Missing means no transcript yet; corrupt is
/// recovered as missing (the pages will be re-fetched and re-merged).
pub fn load(
    paths: &VaultPaths,
    channel_key: &str,
    video_id: &str,
) -> Result<Option<TranscriptDocument>> {
    let file = transcript_path(paths, channel_key, video_id);
    if !file.exists() {
        return Ok(None);
    }

    let raw =
        fs::read_to_string(&file).with_context(|| format!("failed to read {}", file.display()))?;
    match serde_json::from_str(&raw) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            warn::emit(WarnEvent {
                code: "TRANSCRIPT_CORRUPT",
                stage: "transcript-load",
                channel: channel_key,
                video: video_id,
                reason: "treating-as-missing",
                err: &err.to_string(),
            });
            Ok(None)
        }
    }
}

pub fn save(paths: &VaultPaths, doc: &TranscriptDocument) -> Result<PathBuf> {
    let file = transcript_path(paths, &doc.channel_key, &doc.video_id);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let data = serde_json::to_string_pretty(doc)?;
    fs::write(&file, format!("{data}\n"))
        .with_context(|| format!("failed to write {}", file.display()))?;
    Ok(file)
}

/// Merge a freshly fetched batch into an existing transcript.
///
/// Identity is the `(timestamp, text)` pair: page tokens are not stable
/// across runs and in-progress sessions return overlapping windows, so
/// position can never identify a message. Two distinct messages sharing the
/// pair collapse to one; that collision is an accepted loss.
pub fn merge_messages(
    existing: &[TranscriptMessage],
    batch: &[TranscriptMessage],
) -> Vec<TranscriptMessage> {
    let seen: BTreeSet<(&str, &str)> = existing
        .iter()
        .map(|m| (m.timestamp.as_str(), m.text.as_str()))
        .collect();

    let mut merged: Vec<TranscriptMessage> = existing.to_vec();
    for message in batch {
        if seen.contains(&(message.timestamp.as_str(), message.text.as_str())) {
            continue;
        }
        merged.push(message.clone());
    }
    merged.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    merged
}
