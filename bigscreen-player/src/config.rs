//! Configuration loading
//!
//! The daemon is configured once at startup from a TOML file. Everything
//! except the service base URL and the quality preference list is optional.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Daemon configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the media service API
    pub api_base_url: String,

    /// Quality preference list, best first. The first preference an item
    /// carries a playable URL for wins.
    pub quality_ids: Vec<u32>,

    /// Shuffle each queue refill before appending
    #[serde(default)]
    pub randomise: bool,

    /// Single playlist id, kept for older configuration files. Played before
    /// anything in `playlist_ids`.
    #[serde(default)]
    pub playlist_id: Option<u64>,

    /// Playlists to fill the queue from, in order
    #[serde(default)]
    pub playlist_ids: Vec<u64>,

    /// Explicit media item ids to append after the playlists
    #[serde(default)]
    pub media_item_ids: Vec<u64>,

    /// Item ids that must never play
    #[serde(default)]
    pub denylisted_ids: Vec<u64>,

    /// When set, only these live stream ids may preempt the queue
    #[serde(default)]
    pub allowlisted_stream_ids: Option<Vec<u64>>,

    /// Whether live streams preempt on-demand playback
    #[serde(default = "default_play_live_streams")]
    pub play_live_streams: bool,

    /// Player binary handed each item's URL
    #[serde(default = "default_player_command")]
    pub player_command: String,

    /// Audio output routing passed to the player
    #[serde(default = "default_audio_output")]
    pub audio_output: String,
}

fn default_play_live_streams() -> bool {
    true
}

fn default_player_command() -> String {
    "omxplayer".to_string()
}

fn default_audio_output() -> String {
    "hdmi".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&raw)
    }

    /// Parse configuration from TOML text
    pub fn parse(raw: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;

        // Older configuration files name a single playlist; it plays ahead of
        // anything in the plural list.
        if let Some(id) = config.playlist_id.take() {
            config.playlist_ids.insert(0, id);
        }

        Ok(config)
    }
}
