use std::io;

/// All error types for the pulse-sync crate.
///
/// None of these reach an end user from the sync layer itself — polling and
/// the push stream are best-effort and degrade to "stops updating". They are
/// surfaced only to embedders (and the CLI's own one-shot operations).
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("connect failed: {0}")]
    Connect(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("config invalid: {0}")]
    ConfigInvalid(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
