use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::SyncError;

/// Synchronization-layer configuration.
///
/// Read from the `[sync]`-free flat `~/.pulse/config.toml` (every field has
/// a default, so an absent or empty file is valid). Timing values are
/// milliseconds on disk and [`Duration`]s through the accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Backend base URL for REST calls.
    /// Default: `http://localhost:8080`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the push-notification stream endpoint.
    /// Default: `/api/notify/v1/stream`
    #[serde(default = "default_stream_path")]
    pub stream_path: String,

    /// Delay between poll ticks (and between poll retries).
    /// Default: 1000
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,

    /// Quiet period before a coalesced refresh broadcast fires.
    /// Default: 400
    #[serde(default = "default_debounce_delay_ms")]
    pub debounce_delay_ms: u64,

    /// First reconnect delay for the push stream.
    /// Default: 1000
    #[serde(default = "default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,

    /// Reconnect delay cap.
    /// Default: 30000
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,

    /// Poll retries after the initial attempt before giving up.
    /// Default: 5
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_stream_path() -> String {
    "/api/notify/v1/stream".to_string()
}

fn default_check_interval_ms() -> u64 {
    1000
}

fn default_debounce_delay_ms() -> u64 {
    400
}

fn default_reconnect_base_delay_ms() -> u64 {
    1000
}

fn default_reconnect_max_delay_ms() -> u64 {
    30000
}

fn default_max_retries() -> u32 {
    5
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            base_url: default_base_url(),
            stream_path: default_stream_path(),
            check_interval_ms: default_check_interval_ms(),
            debounce_delay_ms: default_debounce_delay_ms(),
            reconnect_base_delay_ms: default_reconnect_base_delay_ms(),
            reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
            max_retries: default_max_retries(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        if !path.exists() {
            return Ok(SyncConfig::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: SyncConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Default config file location: `~/.pulse/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pulse")
            .join("config.toml")
    }

    /// Validate configuration values; catches misconfiguration early.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.base_url.is_empty() {
            return Err(SyncError::ConfigInvalid("base_url must not be empty".into()));
        }
        if self.check_interval_ms == 0 {
            return Err(SyncError::ConfigInvalid(
                "check_interval_ms must be > 0".into(),
            ));
        }
        if self.debounce_delay_ms == 0 {
            return Err(SyncError::ConfigInvalid(
                "debounce_delay_ms must be > 0".into(),
            ));
        }
        if self.reconnect_base_delay_ms == 0 {
            return Err(SyncError::ConfigInvalid(
                "reconnect_base_delay_ms must be > 0".into(),
            ));
        }
        if self.reconnect_max_delay_ms < self.reconnect_base_delay_ms {
            return Err(SyncError::ConfigInvalid(
                "reconnect_max_delay_ms must be >= reconnect_base_delay_ms".into(),
            ));
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }

    pub fn reconnect_base_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_base_delay_ms)
    }

    pub fn reconnect_max_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_delay_ms)
    }

    /// WebSocket URL for the push stream, derived from the REST base URL.
    pub fn stream_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };
        format!("{}{}", ws_base, self.stream_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.stream_path, "/api/notify/v1/stream");
        assert_eq!(config.check_interval(), Duration::from_millis(1000));
        assert_eq!(config.debounce_delay(), Duration::from_millis(400));
        assert_eq!(config.reconnect_base_delay(), Duration::from_millis(1000));
        assert_eq!(config.reconnect_max_delay(), Duration::from_millis(30000));
        assert_eq!(config.max_retries, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SyncConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "base_url = \"https://api.example.com\"\ncheck_interval_ms = 2500\n",
        )
        .unwrap();

        let config = SyncConfig::load(&path).unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.check_interval_ms, 2500);
        // Untouched fields keep defaults
        assert_eq!(config.debounce_delay_ms, 400);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = SyncConfig {
            check_interval_ms: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("check_interval_ms"));
    }

    #[test]
    fn test_validate_rejects_inverted_backoff_bounds() {
        let config = SyncConfig {
            reconnect_base_delay_ms: 5000,
            reconnect_max_delay_ms: 1000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stream_url_scheme_translation() {
        let config = SyncConfig {
            base_url: "https://api.example.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.stream_url(),
            "wss://api.example.com/api/notify/v1/stream"
        );

        let config = SyncConfig::default();
        assert_eq!(
            config.stream_url(),
            "ws://localhost:8080/api/notify/v1/stream"
        );
    }
}
