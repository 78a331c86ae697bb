//! Persisted console settings
//!
//! A small key-value file holding UI preferences. Read once at startup,
//! written only by the explicit setters; backend-sourced state never lands
//! here.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleSettings {
    pub demo_mode: bool,
    pub sidebar_collapsed: bool,
}

impl ConsoleSettings {
    /// Settings file location:
    /// `%APPDATA%/nexus-console/settings.json` on Windows,
    /// `~/.config/nexus-console/settings.json` elsewhere.
    pub fn default_path() -> Result<PathBuf> {
        let base_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir().context("Could not find APPDATA directory")?
        } else {
            dirs::config_dir().context("Could not find config directory")?
        };
        Ok(base_dir.join("nexus-console").join("settings.json"))
    }

    /// Load settings, falling back to defaults when the file is missing.
    /// A corrupt file is an error, not a silent reset.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }
        let raw = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write settings file {}", path.display()))
    }

    pub fn set_demo_mode(&mut self, enabled: bool, path: &Path) -> Result<()> {
        self.demo_mode = enabled;
        self.save(path)
    }

    pub fn set_sidebar_collapsed(&mut self, collapsed: bool, path: &Path) -> Result<()> {
        self.sidebar_collapsed = collapsed;
        self.save(path)
    }
}
