use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub origin: OriginConfig,

    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// HTTP client settings for talking to the origin.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OriginConfig {
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds (manifest or one segment)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl OriginConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_user_agent() -> String {
    format!("segstream/{}", env!("CARGO_PKG_VERSION"))
}
fn default_request_timeout() -> u64 {
    30
}
fn default_connect_timeout() -> u64 {
    10
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Local playback endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    /// `host:port` of the player's TCP listener
    #[serde(default = "default_player_address")]
    pub address: String,
}

fn default_player_address() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            address: default_player_address(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// How many fetched segments may wait for the player before the
    /// producer blocks
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    4
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}
