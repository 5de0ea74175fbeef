use crate::error::VaultError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// One tracked channel. Pure data: the engine never mutates the directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Stable key; names the per-channel transcript directory.
    pub key: String,
    /// Upstream channel identifier.
    pub channel_id: String,
    /// Display name; falls back to the upstream channel title when empty.
    pub name: String,
    /// Video ids known to be non-archival for this channel.
    pub excluded_videos: Vec<String>,
    /// Always-on schedule placeholder video, never archived.
    pub standing_video: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Max videos attempted per invocation (attempted, not advanced).
    pub max_videos: usize,
    /// Max chat pages pulled per video per invocation.
    pub page_budget: usize,
}

/// Ended streams have a bounded transcript and get a deep budget; live streams
/// are open-ended and get a cheap, frequent poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaSection {
    pub live: QuotaConfig,
    pub ended: QuotaConfig,
}

impl Default for QuotaSection {
    fn default() -> Self {
        Self {
            live: QuotaConfig {
                max_videos: 10,
                page_budget: 3,
            },
            ended: QuotaConfig {
                max_videos: 5,
                page_budget: 500,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultConfig {
    pub channels: Vec<ChannelConfig>,
    pub quotas: QuotaSection,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PartialVaultConfig {
    channels: Option<Vec<ChannelConfig>>,
    quotas: Option<QuotaSection>,
    api: Option<ApiConfig>,
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_usize(var: &str, fallback: usize) -> usize {
    match env::var(var) {
        Ok(v) => v.trim().parse::<usize>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn validate(cfg: &VaultConfig) -> Result<()> {
    if cfg.channels.is_empty() {
        return Err(VaultError::InvalidConfig(
            "no channels configured; add [[channels]] entries to the config file".to_string(),
        )
        .into());
    }
    let mut seen_keys = std::collections::BTreeSet::new();
    for channel in &cfg.channels {
        if channel.key.trim().is_empty() {
            return Err(VaultError::InvalidConfig("channel key cannot be empty".to_string()).into());
        }
        if channel.channel_id.trim().is_empty() {
            return Err(VaultError::InvalidConfig(format!(
                "channel `{}` has no channel_id",
                channel.key
            ))
            .into());
        }
        if !seen_keys.insert(channel.key.clone()) {
            return Err(VaultError::InvalidConfig(format!(
                "duplicate channel key `{}`",
                channel.key
            ))
            .into());
        }
    }
    for (mode, quota) in [("live", cfg.quotas.live), ("ended", cfg.quotas.ended)] {
        if quota.max_videos == 0 {
            return Err(VaultError::InvalidConfig(format!(
                "invalid {mode} quota: max_videos must be >= 1"
            ))
            .into());
        }
        if quota.page_budget == 0 {
            return Err(VaultError::InvalidConfig(format!(
                "invalid {mode} quota: page_budget must be >= 1"
            ))
            .into());
        }
    }
    if cfg.api.base_url.trim().is_empty() {
        return Err(VaultError::InvalidConfig("api base_url cannot be empty".to_string()).into());
    }
    if cfg.api.timeout_secs == 0 {
        return Err(
            VaultError::InvalidConfig("api timeout_secs must be >= 1".to_string()).into(),
        );
    }
    Ok(())
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("CHATVAULT_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let home = dirs::home_dir()?;
    Some(home.join(".chatvault").join("channels.toml"))
}

fn apply_file_config(base: &mut VaultConfig, raw: &str, origin: &str) -> Result<()> {
    let parsed: PartialVaultConfig = toml::from_str(raw)
        .map_err(|err| VaultError::InvalidConfig(format!("{origin}: {err}")))?;
    if let Some(channels) = parsed.channels {
        base.channels = channels;
    }
    if let Some(quotas) = parsed.quotas {
        base.quotas = quotas;
    }
    if let Some(api) = parsed.api {
        base.api = api;
    }
    Ok(())
}

fn merge_file_config(base: &mut VaultConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)
        .map_err(|err| VaultError::InvalidConfig(format!("{}: {err}", path.display())))?;
    apply_file_config(base, &raw, &path.display().to_string())
}

pub fn load_config() -> Result<VaultConfig> {
    let mut cfg = VaultConfig::default();
    merge_file_config(&mut cfg)?;

    cfg.api.base_url = env_or_string("CHATVAULT_API_BASE_URL", &cfg.api.base_url);
    cfg.api.timeout_secs = env_or_u64("CHATVAULT_API_TIMEOUT_SECS", cfg.api.timeout_secs);
    cfg.quotas.live.max_videos =
        env_or_usize("CHATVAULT_LIVE_MAX_VIDEOS", cfg.quotas.live.max_videos);
    cfg.quotas.live.page_budget =
        env_or_usize("CHATVAULT_LIVE_PAGE_BUDGET", cfg.quotas.live.page_budget);
    cfg.quotas.ended.max_videos =
        env_or_usize("CHATVAULT_ENDED_MAX_VIDEOS", cfg.quotas.ended.max_videos);
    cfg.quotas.ended.page_budget =
        env_or_usize("CHATVAULT_ENDED_PAGE_BUDGET", cfg.quotas.ended.page_budget);

    validate(&cfg)?;
    Ok(cfg)
}

/// The single static upstream credential. Missing or blank is fatal.
pub fn api_key() -> Result<String> {
    match env::var("CHATVAULT_API_KEY") {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(VaultError::MissingCredential(
            "set CHATVAULT_API_KEY to the upstream data API key".to_string(),
        )
        .into()),
    }
}
