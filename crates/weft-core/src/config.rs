//! Engine configuration.
//!
//! No ambient singletons: the engine's tunables travel in an
//! [`EngineConfig`] passed into the projection and consolidation entry
//! points. Loaded from TOML; a missing file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub time: TimeConfig,
    #[serde(default)]
    pub consolidation: ConsolidationConfig,
}

/// Time-folding policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Cap applied to the second of two adjacent over-threshold time deltas.
    #[serde(default = "default_leap_threshold")]
    pub leap_threshold_minutes: i64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            leap_threshold_minutes: default_leap_threshold(),
        }
    }
}

/// Bounds for free-form tag lists (moods, feelings, wants).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationConfig {
    /// Ceiling enforced by the consolidator: lists longer than this trigger
    /// a replacement event truncated to this length.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    /// Floor the external merger may compress a list down to. The engine
    /// never enforces it; it is surfaced to the collaborator prompt layer.
    #[serde(default = "default_min_items")]
    pub min_items: usize,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            min_items: default_min_items(),
        }
    }
}

const fn default_leap_threshold() -> i64 {
    20
}

const fn default_max_items() -> usize {
    5
}

const fn default_min_items() -> usize {
    2
}

impl EngineConfig {
    /// Load configuration from a TOML file. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// The per-user config path (`<config dir>/weft/config.toml`), if the
    /// platform has a config directory.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weft/config.toml"))
    }

    /// Load the per-user config, falling back to defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the user config exists but cannot be read or
    /// parsed.
    pub fn load_user() -> Result<Self> {
        match Self::user_config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}
