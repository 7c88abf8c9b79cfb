use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the transcription server.
    pub api_base_url: String,
    /// Delay between revealed characters in a chat answer.
    pub reveal_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            reveal_interval_ms: 20,
        }
    }
}

impl Config {
    /// Directory: ~/.config/transcript-chat/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("transcript-chat");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if the file is missing or
    /// malformed. With no config file present the client behaves exactly
    /// like the stock setup: server on 127.0.0.1:8000, 20 ms reveal.
    pub fn load() -> Self {
        let path = Self::path();
        match fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Ignoring malformed config at {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }
}
