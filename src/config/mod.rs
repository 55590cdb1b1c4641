mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./segstream.toml",
        "~/.config/segstream/config.toml",
        "/etc/segstream/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.pipeline.channel_capacity == 0 {
        anyhow::bail!("pipeline.channel_capacity must be at least 1");
    }

    if config.player.address.trim().is_empty() {
        anyhow::bail!("player.address cannot be empty");
    }

    if config.origin.request_timeout_secs == 0 {
        anyhow::bail!("origin.request_timeout_secs cannot be 0");
    }

    if config.origin.connect_timeout_secs == 0 {
        anyhow::bail!("origin.connect_timeout_secs cannot be 0");
    }

    Ok(())
}
