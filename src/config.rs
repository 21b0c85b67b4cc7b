use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::util::expand_tilde;
use crate::{elog_debug, Error, Result};

pub const DEFAULT_EMOJIS: [&str; 10] = ["😀", "😊", "😂", "❤️", "👍", "🎉", "🌟", "💡", "🔥", "✨"];

/// Locale-style time of day, e.g. `3:04:05 PM`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%-I:%M:%S %p";

pub const DEFAULT_IMAGE_TILE_WIDTH: u16 = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Emoji picker palette, laid out five per row.
    pub emojis: Vec<String>,
    /// chrono format string for message timestamps.
    pub timestamp_format: String,
    /// Starting directory for the file picker (defaults to the cwd).
    pub picker_dir: Option<String>,
    /// Maximum width of an image tile in the message list.
    pub image_tile_width: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            emojis: DEFAULT_EMOJIS.iter().map(|e| e.to_string()).collect(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            picker_dir: None,
            image_tile_width: DEFAULT_IMAGE_TILE_WIDTH,
        }
    }
}

impl Config {
    pub fn app_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".ephemera"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("config.toml"))
    }

    /// Resolved starting directory for the file picker.
    pub fn effective_picker_dir(&self) -> PathBuf {
        match &self.picker_dir {
            Some(dir) => expand_tilde(dir),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        elog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            elog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config = Self::from_toml(&fs::read_to_string(&path)?)?;
        elog_debug!(
            "Config loaded: emojis={} timestamp_format={:?} picker_dir={:?}",
            config.emojis.len(),
            config.timestamp_format,
            config.picker_dir
        );
        Ok(config)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(s)?;
        if config.emojis.is_empty() {
            config.emojis = Self::default().emojis;
        }
        if config.image_tile_width == 0 {
            config.image_tile_width = DEFAULT_IMAGE_TILE_WIDTH;
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let dir = Self::app_dir()?;
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        let path = Self::config_path()?;
        fs::write(&path, toml::to_string_pretty(self)?)?;
        elog_debug!("Config saved to {}", path.display());
        Ok(())
    }
}
