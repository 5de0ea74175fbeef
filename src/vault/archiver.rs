use crate::vault::config::QuotaConfig;
use crate::vault::cursor::{self, CursorMap, CursorState};
use crate::vault::paths::VaultPaths;
use crate::vault::registry::{self, VideoEntry, VideoStatus};
use crate::vault::source::StreamSource;
use crate::vault::transcript::{self, TranscriptDocument};
use crate::vault::util;
use crate::vault::warn::{self, WarnEvent};
use anyhow::Result;

/// Which lifecycle state this archiver instance sweeps. The two modes share
/// one loop and differ in target status, budgets, and what exhaustion means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveMode {
    Live,
    Ended,
}

impl ArchiveMode {
    pub fn target_status(self) -> VideoStatus {
        match self {
            Self::Live => VideoStatus::Live,
            Self::Ended => VideoStatus::Ended,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Ended => "ended",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveOutcome {
    pub candidates: usize,
    pub attempted: usize,
    pub pages_fetched: usize,
    pub messages_merged: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct VideoProgress {
    pages: usize,
    merged: usize,
    completed: bool,
}

pub struct ChatArchiver<'a> {
    source: &'a dyn StreamSource,
    mode: ArchiveMode,
    quota: QuotaConfig,
}

impl<'a> ChatArchiver<'a> {
    pub fn new(source: &'a dyn StreamSource, mode: ArchiveMode, quota: QuotaConfig) -> Self {
        Self {
            source,
            mode,
            quota,
        }
    }

    /// Advance transcripts for up to `max_videos` candidates in registry
    /// order. Transcript and cursor writes land after every page so a crash
    /// costs nothing already fetched; the registry delta is flushed once at
    /// the end of the run.
    pub fn run(&self, paths: &VaultPaths) -> Result<ArchiveOutcome> {
        let mut entries = registry::load(paths)?;
        let mut cursors = cursor::load(paths)?;
        let target = self.mode.target_status();

        let mut outcome = ArchiveOutcome {
            candidates: entries
                .iter()
                .filter(|e| !e.chat_fetched && e.status == target)
                .count(),
            ..ArchiveOutcome::default()
        };

        let mut registry_dirty = false;
        for entry in entries.iter_mut() {
            if outcome.attempted >= self.quota.max_videos {
                break;
            }
            if entry.chat_fetched || entry.status != target {
                continue;
            }
            outcome.attempted += 1;

            match self.archive_video(paths, entry, &mut cursors) {
                Ok(progress) => {
                    outcome.pages_fetched += progress.pages;
                    outcome.messages_merged += progress.merged;
                    if progress.completed {
                        entry.chat_fetched = true;
                        registry_dirty = true;
                        outcome.completed += 1;
                    }
                }
                Err(err) => {
                    warn::emit(WarnEvent {
                        code: "VIDEO_ARCHIVE_FAILED",
                        stage: "chat-archive",
                        channel: &entry.channel_key,
                        video: &entry.video_id,
                        reason: "no-data-this-round",
                        err: &format!("{err:#}"),
                    });
                }
            }
        }

        if registry_dirty {
            registry::save(paths, &entries)?;
        }
        Ok(outcome)
    }

    fn archive_video(
        &self,
        paths: &VaultPaths,
        video: &VideoEntry,
        cursors: &mut CursorMap,
    ) -> Result<VideoProgress> {
        let Some(session_id) = self.resolve_session(paths, video, cursors)? else {
            // Permanent no-session answer: nothing to fetch, ever.
            return Ok(VideoProgress {
                completed: true,
                ..VideoProgress::default()
            });
        };

        let mut doc = transcript::load(paths, &video.channel_key, &video.video_id)?
            .unwrap_or_else(|| TranscriptDocument {
                video_id: video.video_id.clone(),
                channel_key: video.channel_key.clone(),
                channel_name: video.channel_name.clone(),
                fetched_at: String::new(),
                messages: Vec::new(),
            });

        let mut token = cursors
            .get(&video.video_id)
            .and_then(|c| c.continuation_token.clone())
            .unwrap_or_default();
        let mut progress = VideoProgress::default();
        let mut exhausted = false;

        while progress.pages < self.quota.page_budget {
            let page = self.source.fetch_chat_page(&session_id, &token)?;
            progress.pages += 1;

            if !page.messages.is_empty() {
                let before = doc.messages.len();
                doc.messages = transcript::merge_messages(&doc.messages, &page.messages);
                progress.merged += doc.messages.len() - before;
                doc.fetched_at = util::now_iso8601();
                transcript::save(paths, &doc)?;
            }

            // An empty page means the chat is drained even when a token came
            // back with it.
            match page.next_token {
                Some(next) if !page.messages.is_empty() => {
                    token = next;
                    set_cursor_token(cursors, &video.video_id, &session_id, Some(token.clone()));
                    cursor::save(paths, cursors)?;
                }
                _ => {
                    exhausted = true;
                    break;
                }
            }
        }

        if exhausted {
            match self.mode {
                // A bounded transcript fully drained is terminal.
                ArchiveMode::Ended => {
                    set_cursor_token(cursors, &video.video_id, &session_id, None);
                    cursor::save(paths, cursors)?;
                    progress.completed = true;
                }
                // "No new messages right now" is not completion for an open
                // stream: re-poll from scratch next invocation and let the
                // merge absorb the overlap.
                ArchiveMode::Live => {
                    set_cursor_token(
                        cursors,
                        &video.video_id,
                        &session_id,
                        Some(String::new()),
                    );
                    cursor::save(paths, cursors)?;
                }
            }
        }
        // Budget-limited stop: the resumption token was already persisted on
        // the last page advance and the video stays partial.

        Ok(progress)
    }

    /// Session handle for a video, asking upstream at most once ever. A
    /// recorded null session is permanent and short-circuits without a call.
    fn resolve_session(
        &self,
        paths: &VaultPaths,
        video: &VideoEntry,
        cursors: &mut CursorMap,
    ) -> Result<Option<String>> {
        if let Some(state) = cursors.get(&video.video_id) {
            return Ok(state.session_id.clone());
        }

        let resolved = self.source.resolve_chat_session(&video.video_id)?;
        cursors.insert(
            video.video_id.clone(),
            CursorState {
                session_id: resolved.clone(),
                continuation_token: None,
            },
        );
        cursor::save(paths, cursors)?;
        Ok(resolved)
    }
}

fn set_cursor_token(
    cursors: &mut CursorMap,
    video_id: &str,
    session_id: &str,
    token: Option<String>,
) {
    let entry = cursors.entry(video_id.to_string()).or_default();
    entry.session_id = Some(session_id.to_string());
    entry.continuation_token = token;
}
