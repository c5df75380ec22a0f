//! Persistent CLI settings
//!
//! Read from `<config dir>/pipeql/settings.json`. A missing file means
//! defaults; command-line flags override whatever is loaded.

use anyhow::{Context, Result};
use pipeql_pipe::PipeOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Filter used when neither `RUST_LOG` nor the settings file provide one
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeqlSettings {
    /// Conversion options
    pub pipe: PipeOptions,
    /// `tracing` filter directive, e.g. `info,pipeql_pipe=debug`
    pub log_filter: String,
}

impl Default for PipeqlSettings {
    fn default() -> Self {
        Self {
            pipe: PipeOptions::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl PipeqlSettings {
    /// Loads settings from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    /// Loads settings from `path`, falling back to defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&content).with_context(|| "Failed to parse settings JSON")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn settings_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(config_dir.join("pipeql").join("settings.json"))
    }
}
