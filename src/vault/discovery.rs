use crate::vault::config::ChannelConfig;
use crate::vault::paths::VaultPaths;
use crate::vault::registry::{self, VideoEntry, VideoStatus};
use crate::vault::source::{LiveDetail, StreamSource, VideoDetail};
use crate::vault::warn::{self, WarnEvent};
use anyhow::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct DiscoveryOutcome {
    pub channels_scanned: usize,
    pub channels_failed: usize,
    pub videos_seen: usize,
    pub inserted: usize,
    pub updated: usize,
}

pub struct Discovery<'a> {
    source: &'a dyn StreamSource,
}

impl<'a> Discovery<'a> {
    pub fn new(source: &'a dyn StreamSource) -> Self {
        Self { source }
    }

    /// Scan every channel and fold the results into the registry.
    ///
    /// Re-running with identical upstream answers leaves the registry
    /// unchanged: upsert preserves `chat_fetched` and never regresses status.
    /// A channel whose upstream query fails contributes nothing this round
    /// and does not disturb its siblings.
    pub fn run(&self, paths: &VaultPaths, channels: &[ChannelConfig]) -> Result<DiscoveryOutcome> {
        let mut entries = registry::load(paths)?;
        let mut outcome = DiscoveryOutcome::default();

        for channel in channels {
            outcome.channels_scanned += 1;
            let discovered = match self.discover_channel(channel) {
                Ok(discovered) => discovered,
                Err(err) => {
                    outcome.channels_failed += 1;
                    warn::emit(WarnEvent {
                        code: "CHANNEL_DISCOVERY_FAILED",
                        stage: "discovery",
                        channel: &channel.key,
                        video: "",
                        reason: "no-data-this-round",
                        err: &format!("{err:#}"),
                    });
                    continue;
                }
            };

            outcome.videos_seen += discovered.len();
            let upserted = registry::upsert(&mut entries, discovered);
            outcome.inserted += upserted.inserted;
            outcome.updated += upserted.updated;
        }

        registry::sort_by_published_at(&mut entries);
        registry::save(paths, &entries)?;
        Ok(outcome)
    }

    /// Archival-eligible videos for one channel, oldest first.
    fn discover_channel(&self, channel: &ChannelConfig) -> Result<Vec<VideoEntry>> {
        let ids = self.source.list_channel_videos(&channel.channel_id)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let details = self.source.fetch_video_details(&ids)?;
        let mut entries = Vec::new();
        for detail in details {
            if !is_eligible(channel, &detail) {
                continue;
            }
            let Some(live) = detail.live.as_ref() else {
                continue;
            };
            entries.push(VideoEntry {
                video_id: detail.video_id.clone(),
                channel_key: channel.key.clone(),
                channel_name: if channel.name.trim().is_empty() {
                    detail.channel_title.clone()
                } else {
                    channel.name.clone()
                },
                title: detail.title.clone(),
                published_at: detail.published_at.clone(),
                status: derive_status(live),
                chat_fetched: false,
            });
        }
        Ok(entries)
    }
}

/// Eligible: live-origin broadcast, not excluded, not the standing
/// placeholder.
fn is_eligible(channel: &ChannelConfig, detail: &VideoDetail) -> bool {
    if detail.live.is_none() {
        return false;
    }
    if channel
        .excluded_videos
        .iter()
        .any(|id| id == &detail.video_id)
    {
        return false;
    }
    if channel.standing_video.as_deref() == Some(detail.video_id.as_str()) {
        return false;
    }
    true
}

fn derive_status(live: &LiveDetail) -> VideoStatus {
    if live.actual_end_time.is_some() {
        VideoStatus::Ended
    } else if live.actual_start_time.is_some() {
        VideoStatus::Live
    } else {
        VideoStatus::Upcoming
    }
}
