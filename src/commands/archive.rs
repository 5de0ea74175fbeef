use crate::commands::CommandReport;
use crate::error::VaultError;
use crate::vault::archiver::{ArchiveMode, ChatArchiver};
use crate::vault::config;
use crate::vault::paths::resolve_paths;
use crate::youtube::client::YouTubeClient;
use anyhow::Result;

pub fn run(mode: ArchiveMode) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let cfg = config::load_config()?;
    if !paths.registry_file.exists() {
        return Err(VaultError::MissingRegistry(format!(
            "{} does not exist; run `chatvault discover` first",
            paths.registry_file.display()
        ))
        .into());
    }
    let key = config::api_key()?;
    let client = YouTubeClient::new(key, &cfg.api.base_url, cfg.api.timeout_secs)?;

    let quota = match mode {
        ArchiveMode::Live => cfg.quotas.live,
        ArchiveMode::Ended => cfg.quotas.ended,
    };
    let outcome = ChatArchiver::new(&client, mode, quota).run(&paths)?;

    let mut report = CommandReport::new("archive");
    report.detail(format!("mode={}", mode.as_str()));
    report.detail(format!("candidates={}", outcome.candidates));
    report.detail(format!("attempted={}", outcome.attempted));
    report.detail(format!("pages_fetched={}", outcome.pages_fetched));
    report.detail(format!("messages_merged={}", outcome.messages_merged));
    report.detail(format!("completed={}", outcome.completed));
    Ok(report)
}
