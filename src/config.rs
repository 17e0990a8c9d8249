//! Application configuration
//!
//! All calculation coefficients (baseline windows, readiness weights, zone
//! modifiers) live here so deployments can tune them without recompiling.
//! Stored as TOML under the user config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MetricsError, Result};
use crate::index::IndexConfig;
use crate::load::LoadConfig;
use crate::readiness::ReadinessConfig;
use crate::zones::ZoneConfig;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MetricsConfig {
    /// Readiness scoring settings
    #[serde(default)]
    pub readiness: ReadinessConfig,

    /// Load ratio window settings
    #[serde(default)]
    pub load: LoadConfig,

    /// Training index composition settings
    #[serde(default)]
    pub index: IndexConfig,

    /// Zone adaptation coefficients
    #[serde(default)]
    pub zones: ZoneConfig,
}

impl MetricsConfig {
    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        self.load.validate()
    }

    /// Default configuration file path under the user config directory
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pulseparse")
            .join("config.toml")
    }

    /// Load configuration from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: MetricsConfig = toml::from_str(&contents)
            .map_err(|e| MetricsError::Configuration(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default path, falling back to defaults if absent
    pub fn load_or_default() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration as TOML, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| MetricsError::Configuration(e.to_string()))?;
        fs::write(path, contents)?;
        tracing::info!(path = %path.display(), "configuration saved");
        Ok(())
    }
}
