use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::color::ColorKey;
use crate::term::TermCaps;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid color for '{name}': {value}")]
    InvalidColor { name: String, value: String },
}

/// Objects shown when the config has no `[colors]` table
pub const DEFAULT_OBJECTS: &[(&str, &str)] = &[
    ("normal", "default on default"),
    ("header", "black on cyan"),
    ("status", "black on cyan"),
    ("indicator", "black on yellow"),
    ("search", "black on yellow"),
    ("error", "red on default"),
    ("warning", "yellow"),
    ("quoted", "blue"),
    ("tree", "magenta"),
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Number of color pairs, overrides terminal detection
    pub capacity: Option<u32>,
    /// Whether RGB colors may be bound, overrides terminal detection
    pub truecolor: Option<bool>,
    /// Object name to `"<fg> on <bg>"`
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
}

impl Config {
    /// Load global and local config
    pub fn load() -> Result<Config, ConfigError> {
        load_config()
    }

    /// Merge two configs, with `other` taking precedence
    pub fn merge(self, other: Config) -> Config {
        let mut colors = self.colors;
        colors.extend(other.colors);

        Config {
            capacity: other.capacity.or(self.capacity),
            truecolor: other.truecolor.or(self.truecolor),
            colors,
        }
    }

    /// Apply the config's overrides to detected terminal capabilities
    pub fn term_caps(&self, detected: TermCaps) -> TermCaps {
        detected.with_overrides(self.capacity, self.truecolor)
    }

    /// Parse the configured objects, falling back to `DEFAULT_OBJECTS`
    pub fn color_objects(&self) -> Result<Vec<(String, ColorKey)>, ConfigError> {
        let parse = |name: &str, value: &str| {
            value
                .parse::<ColorKey>()
                .map(|key| (name.to_string(), key))
                .map_err(|_| ConfigError::InvalidColor {
                    name: name.to_string(),
                    value: value.to_string(),
                })
        };

        if self.colors.is_empty() {
            return DEFAULT_OBJECTS
                .iter()
                .map(|&(name, value)| parse(name, value))
                .collect();
        }

        self.colors
            .iter()
            .map(|(name, value)| parse(name.as_str(), value.as_str()))
            .collect()
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Load global config from `<config_dir>/cpair/config.toml`
fn load_global_config(config_dir: Option<&Path>) -> Result<Option<Config>, ConfigError> {
    if let Some(path) = config_dir.map(|p| p.join("cpair").join("config.toml")) {
        if path.exists() {
            return read_config(&path).map(Some);
        }
    }

    Ok(None)
}

/// Load local config from .cpair/config.toml in the start directory or its parents
fn load_local_config(start_path: &Path) -> Result<Option<Config>, ConfigError> {
    let mut current = start_path.to_path_buf();

    loop {
        let config_path = current.join(".cpair").join("config.toml");
        if config_path.exists() {
            return read_config(&config_path).map(Some);
        }

        if !current.pop() {
            break;
        }
    }

    Ok(None)
}

/// Load and merge configs (global + local) from explicit locations
pub fn load_config_from(
    config_dir: Option<PathBuf>,
    start_path: &Path,
) -> Result<Config, ConfigError> {
    let global = load_global_config(config_dir.as_deref())?.unwrap_or_default();
    let local = load_local_config(start_path)?.unwrap_or_default();

    Ok(global.merge(local))
}

/// Load and merge configs (global + local)
pub fn load_config() -> Result<Config, ConfigError> {
    let current_dir = std::env::current_dir()?;
    load_config_from(dirs::config_dir(), &current_dir)
}
