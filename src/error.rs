use thiserror::Error;

/// Configuration-level failures. These abort the whole invocation; everything
/// recoverable is handled in place and reported through `vault::warn`.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("api credential missing: {0}")]
    MissingCredential(String),
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
    #[error("video registry unavailable: {0}")]
    MissingRegistry(String),
}
