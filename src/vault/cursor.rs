use crate::vault::paths::VaultPaths;
use crate::vault::warn::{self, WarnEvent};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Resumable fetch state for one video, kept apart from the registry so a
/// failed registry rewrite can never lose pagination progress.
///
/// An absent map entry means the chat session was never resolved. A present
/// entry with `session_id: None` is terminal: upstream has said the session
/// will never be available, and no future run may ask again.
///
/// `continuation_token` is `None` when pagination is exhausted and
/// `Some("")` for an explicit start-from-scratch; live-mode polling relies on
/// that distinction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CursorState {
    pub session_id: Option<String>,
    pub continuation_token: Option<String>,
}

pub type CursorMap = BTreeMap<String, CursorState>;

pub fn cursor_path(paths: &VaultPaths) -> PathBuf {
    paths.cursor_file.clone()
}

/// Load the cursor store. Missing, unreadable, or corrupt files are a cold
/// start: at worst the next run re-fetches pages the merge step will dedup.
pub fn load(paths: &VaultPaths) -> Result<CursorMap> {
    let file = cursor_path(paths);
    if !file.exists() {
        return Ok(CursorMap::new());
    }

    let raw = match fs::read_to_string(&file) {
        Ok(raw) => raw,
        Err(err) => {
            warn::emit(WarnEvent {
                code: "CURSOR_STORE_UNREADABLE",
                stage: "cursor-load",
                channel: "",
                video: "",
                reason: "cold-start",
                err: &err.to_string(),
            });
            return Ok(CursorMap::new());
        }
    };
    match serde_json::from_str(&raw) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            warn::emit(WarnEvent {
                code: "CURSOR_STORE_CORRUPT",
                stage: "cursor-load",
                channel: "",
                video: "",
                reason: "cold-start",
                err: &err.to_string(),
            });
            Ok(CursorMap::new())
        }
    }
}

pub fn save(paths: &VaultPaths, cursors: &CursorMap) -> Result<()> {
    let file = cursor_path(paths);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let data = serde_json::to_string_pretty(cursors)?;
    fs::write(&file, format!("{data}\n"))
        .with_context(|| format!("failed to write {}", file.display()))?;
    Ok(())
}
