//! Persisted user settings (lives in the OS config directory).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::TimelineConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub timeline: TimelineConfig,
    /// Dataset opened on startup when no path is given on the command line.
    pub dataset: Option<PathBuf>,
}

impl Settings {
    /// `<config dir>/settings.json`, or `./settings.json` when the platform
    /// has no config directory.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "RustTimelineApp")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("settings.json"))
    }

    /// Load from `path`. A missing file yields defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.timeline.validate()?;
        Ok(settings)
    }

    /// Load from the default location, falling back to defaults on any error.
    pub fn load() -> Self {
        let path = Self::default_path();
        Self::load_from(&path).unwrap_or_else(|e| {
            log::warn!("ignoring settings at {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }
}
