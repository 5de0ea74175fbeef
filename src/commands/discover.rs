use crate::commands::CommandReport;
use crate::vault::config;
use crate::vault::discovery::Discovery;
use crate::vault::paths::resolve_paths;
use crate::youtube::client::YouTubeClient;
use anyhow::Result;

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let cfg = config::load_config()?;
    let key = config::api_key()?;
    let client = YouTubeClient::new(key, &cfg.api.base_url, cfg.api.timeout_secs)?;

    let outcome = Discovery::new(&client).run(&paths, &cfg.channels)?;

    let mut report = CommandReport::new("discover");
    report.detail(format!("registry={}", paths.registry_file.display()));
    report.detail(format!("channels_scanned={}", outcome.channels_scanned));
    report.detail(format!("channels_failed={}", outcome.channels_failed));
    report.detail(format!("videos_seen={}", outcome.videos_seen));
    report.detail(format!("inserted={}", outcome.inserted));
    report.detail(format!("updated={}", outcome.updated));
    Ok(report)
}
