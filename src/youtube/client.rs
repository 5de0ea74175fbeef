use crate::vault::source::{ChatPage, LiveDetail, StreamSource, VideoDetail};
use crate::vault::transcript::TranscriptMessage;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Upstream batch cap for detail lookups.
const DETAIL_BATCH_SIZE: usize = 50;
const SEARCH_PAGE_SIZE: u32 = 50;
const CHAT_PAGE_SIZE: u32 = 200;

/// Blocking client for the upstream data API. One instance per invocation;
/// all requests go through the same keyed, timeout-bounded `Client`.
pub struct YouTubeClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(api_key: String, base_url: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(params)
            .send()
            .with_context(|| format!("request to {path} failed"))?
            .error_for_status()
            .with_context(|| format!("request to {path} rejected"))?;
        response
            .json()
            .with_context(|| format!("invalid JSON from {path}"))
    }
}

// Wire shapes. Everything defaults so an upstream field shuffle degrades to
// empty values instead of a parse failure.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SearchListResponse {
    next_page_token: Option<String>,
    items: Vec<SearchItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VideoListResponse {
    items: Vec<VideoItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VideoItem {
    id: String,
    snippet: Option<VideoSnippet>,
    live_streaming_details: Option<WireLiveDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VideoSnippet {
    published_at: String,
    title: String,
    channel_title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireLiveDetails {
    active_live_chat_id: Option<String>,
    actual_start_time: Option<String>,
    actual_end_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ChatListResponse {
    next_page_token: Option<String>,
    items: Vec<ChatItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatItem {
    snippet: Option<ChatSnippet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ChatSnippet {
    #[serde(rename = "type")]
    kind: String,
    published_at: String,
    display_message: Option<String>,
    video_offset_time_msec: Option<String>,
}

fn video_detail_from_item(item: VideoItem) -> VideoDetail {
    let snippet = item.snippet.unwrap_or_default();
    VideoDetail {
        video_id: item.id,
        title: snippet.title,
        channel_title: snippet.channel_title,
        published_at: snippet.published_at,
        live: item.live_streaming_details.map(|details| LiveDetail {
            session_id: details.active_live_chat_id.filter(|id| !id.is_empty()),
            actual_start_time: details.actual_start_time,
            actual_end_time: details.actual_end_time,
        }),
    }
}

fn chat_message_from_item(item: ChatItem) -> Option<TranscriptMessage> {
    let snippet = item.snippet?;
    let offset_seconds = snippet
        .video_offset_time_msec
        .as_deref()
        .and_then(|msec| msec.parse::<i64>().ok())
        .map(|msec| msec / 1000)
        .unwrap_or(0);
    Some(TranscriptMessage {
        timestamp: snippet.published_at,
        offset_seconds,
        text: snippet.display_message.unwrap_or_default(),
        kind: snippet.kind,
    })
}

fn chat_page_from_response(parsed: ChatListResponse) -> ChatPage {
    ChatPage {
        messages: parsed
            .items
            .into_iter()
            .filter_map(chat_message_from_item)
            .collect(),
        next_token: parsed.next_page_token.filter(|token| !token.is_empty()),
    }
}

impl StreamSource for YouTubeClient {
    fn list_channel_videos(&self, channel_id: &str) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut page_token = String::new();
        loop {
            let mut params = vec![
                ("key", self.api_key.clone()),
                ("channelId", channel_id.to_string()),
                ("part", "id".to_string()),
                ("type", "video".to_string()),
                ("order", "date".to_string()),
                ("maxResults", SEARCH_PAGE_SIZE.to_string()),
            ];
            if !page_token.is_empty() {
                params.push(("pageToken", page_token.clone()));
            }

            let parsed: SearchListResponse = self.get_json("/youtube/v3/search", &params)?;
            if parsed.items.is_empty() {
                break;
            }
            for item in parsed.items {
                if let Some(id) = item.id.video_id {
                    ids.push(id);
                }
            }
            match parsed.next_page_token {
                Some(next) if !next.is_empty() => page_token = next,
                _ => break,
            }
        }

        // upstream lists newest first; registry order wants oldest first
        ids.reverse();
        Ok(ids)
    }

    fn fetch_video_details(&self, video_ids: &[String]) -> Result<Vec<VideoDetail>> {
        let mut out = Vec::new();
        for chunk in video_ids.chunks(DETAIL_BATCH_SIZE) {
            let params = vec![
                ("key", self.api_key.clone()),
                ("part", "snippet,liveStreamingDetails".to_string()),
                ("id", chunk.join(",")),
            ];
            let parsed: VideoListResponse = self.get_json("/youtube/v3/videos", &params)?;
            out.extend(parsed.items.into_iter().map(video_detail_from_item));
        }
        Ok(out)
    }

    fn resolve_chat_session(&self, video_id: &str) -> Result<Option<String>> {
        let params = vec![
            ("key", self.api_key.clone()),
            ("part", "liveStreamingDetails".to_string()),
            ("id", video_id.to_string()),
        ];
        let parsed: VideoListResponse = self.get_json("/youtube/v3/videos", &params)?;
        let Some(item) = parsed.items.into_iter().next() else {
            anyhow::bail!("video {video_id} not found upstream");
        };
        Ok(item
            .live_streaming_details
            .and_then(|details| details.active_live_chat_id)
            .filter(|id| !id.is_empty()))
    }

    fn fetch_chat_page(&self, session_id: &str, page_token: &str) -> Result<ChatPage> {
        let mut params = vec![
            ("key", self.api_key.clone()),
            ("liveChatId", session_id.to_string()),
            ("part", "snippet".to_string()),
            ("maxResults", CHAT_PAGE_SIZE.to_string()),
        ];
        if !page_token.is_empty() {
            params.push(("pageToken", page_token.to_string()));
        }
        let parsed: ChatListResponse = self.get_json("/youtube/v3/liveChat/messages", &params)?;
        Ok(chat_page_from_response(parsed))
    }
}
