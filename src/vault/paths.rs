use anyhow::Result;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct VaultPaths {
    pub data_dir: PathBuf,
    pub registry_file: PathBuf,
    pub cursor_file: PathBuf,
    pub transcripts_dir: PathBuf,
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> Result<VaultPaths> {
    let home = required_home_dir()?;
    let data_dir = env_or_default_path("CHATVAULT_DATA_DIR", home.join("chatvault"));

    let registry_file = env_or_default_path("CHATVAULT_REGISTRY_FILE", data_dir.join("videos.json"));
    let cursor_file = env_or_default_path(
        "CHATVAULT_CURSOR_FILE",
        data_dir.join("state/chat_cursors.json"),
    );
    let transcripts_dir =
        env_or_default_path("CHATVAULT_TRANSCRIPTS_DIR", data_dir.join("transcripts"));

    Ok(VaultPaths {
        data_dir,
        registry_file,
        cursor_file,
        transcripts_dir,
    })
}
