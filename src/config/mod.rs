// Configuration management for reelmark
// Handles loading/saving settings, with sensible defaults when config is missing

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::library::{OrderingPolicy, DEFAULT_EXTENSION};
use crate::session::ResumePolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub media_directories: Vec<PathBuf>,
    pub stats_path: PathBuf,
    pub player: PlayerConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub media_extension: String,
    pub ordering: OrderingPolicy,
    pub resume: ResumePolicy,
    pub fine_seek_secs: f64,
    pub coarse_seek_secs: f64,
    pub rate_step: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub tick_ms: u64,
    /// Length the clock transport gives every file, since nothing here decodes video.
    pub simulated_duration_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media_directories: vec![
                dirs::video_dir().unwrap_or_else(|| PathBuf::from("~/Videos")),
            ],
            stats_path: Self::app_dir().join("stats.db"),
            player: PlayerConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            media_extension: DEFAULT_EXTENSION.to_string(),
            ordering: OrderingPolicy::UnopenedFirst,
            resume: ResumePolicy::Resume,
            fine_seek_secs: 3.7,
            coarse_seek_secs: 8.0,
            rate_step: 0.2,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: 250,
            simulated_duration_secs: 600,
        }
    }
}

impl UiConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(10))
    }

    pub fn simulated_duration(&self) -> Duration {
        Duration::from_secs(self.simulated_duration_secs.max(1))
    }
}

impl Config {
    /// Loads the default config file, writing one with defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", config_path.display()))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("reelmark");

        Ok(config_dir.join("config.toml"))
    }

    fn app_dir() -> PathBuf {
        config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reelmark")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reelmark").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.player, PlayerConfig::default());

        let again = Config::load_from(&path).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[player]\nordering = \"alphabetical\"\nresume = \"restart-from-zero\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.player.ordering, OrderingPolicy::Alphabetical);
        assert_eq!(config.player.resume, ResumePolicy::RestartFromZero);
        assert_eq!(config.player.media_extension, "webm");
        assert_eq!(config.player.fine_seek_secs, 3.7);
        assert_eq!(config.ui.tick_ms, 250);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "player = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
