use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::SongwatchError;
use crate::selectors::{SelectorOverrides, SelectorTable};

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub watcher: WatcherConfig,
    /// Overrides merged over the embedded selector table.
    #[serde(default)]
    pub selectors: SelectorOverrides,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Print the watch event log after a replay.
    #[serde(default)]
    pub log_events: bool,
}

impl AppConfig {
    /// Load config: user file if it exists, built-in defaults otherwise.
    pub fn load() -> Result<Self, SongwatchError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            Self::load_from(&user_path)
        } else {
            Self::parse(DEFAULT_CONFIG)
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, SongwatchError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SongwatchError::Config(format!("{}: {e}", path.display())))?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self, SongwatchError> {
        toml::from_str(content).map_err(|e| SongwatchError::Config(e.to_string()))
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), SongwatchError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SongwatchError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SongwatchError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Embedded selector table with this config's overrides applied.
    pub fn selector_table(&self) -> Result<SelectorTable, SongwatchError> {
        let mut table = SelectorTable::embedded();
        table.merge(&self.selectors);
        table.validate()?;
        Ok(table)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "songwatch")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
