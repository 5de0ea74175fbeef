use crate::vault::transcript::TranscriptMessage;
use anyhow::Result;

/// Live-broadcast detail attached to a video. Only videos carrying this are
/// archival-eligible; plain uploads and shorts have none.
#[derive(Debug, Clone, Default)]
pub struct LiveDetail {
    /// Chat session handle; `None` when the session is gone for good.
    pub session_id: Option<String>,
    pub actual_start_time: Option<String>,
    pub actual_end_time: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VideoDetail {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub published_at: String,
    pub live: Option<LiveDetail>,
}

/// One page of chat messages plus the token for the next page. `next_token`
/// of `None` means pagination is exhausted.
#[derive(Debug, Clone, Default)]
pub struct ChatPage {
    pub messages: Vec<TranscriptMessage>,
    pub next_token: Option<String>,
}

/// The three upstream query shapes the engine consumes. Implemented by the
/// real HTTP client and by scripted fakes in tests; the engine is
/// single-threaded, so the seam is a plain `&dyn` borrow.
pub trait StreamSource {
    /// All video ids for a channel, oldest first.
    fn list_channel_videos(&self, channel_id: &str) -> Result<Vec<String>>;

    /// Batch detail lookup; implementations chunk to the upstream batch cap.
    fn fetch_video_details(&self, video_ids: &[String]) -> Result<Vec<VideoDetail>>;

    /// Resolve the chat session handle for one video. `Ok(None)` is the
    /// terminal no-session answer, not an error.
    fn resolve_chat_session(&self, video_id: &str) -> Result<Option<String>>;

    /// One page of chat. An empty `page_token` starts from scratch.
    fn fetch_chat_page(&self, session_id: &str, page_token: &str) -> Result<ChatPage>;
}
