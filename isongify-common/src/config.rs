//! Configuration loading and data file resolution
//!
//! The TOML file is bootstrap only: it names the catalogue to load, the
//! top-K size and logging settings. A missing file is not fatal; callers
//! fall back to compiled defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable consulted by [`resolve_data_file`]
pub const DATA_FILE_ENV: &str = "ISONGIFY_DATA_FILE";

/// Catalogue file used when nothing else is configured
pub const DEFAULT_DATA_FILE: &str = "songs.csv";

/// Number of entries returned by the top-K query unless configured otherwise
pub const DEFAULT_TOP_K: usize = 5;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Catalogue CSV file (relative or absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    /// Size of the top-K result
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            top_k: DEFAULT_TOP_K,
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Load and parse a TOML configuration file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        let config: TomlConfig = toml::from_str(&toml_str)?;
        info!("Loaded TOML configuration from {:?}", path);
        Ok(config)
    }

    /// Load a TOML configuration file, falling back to defaults when it is missing
    ///
    /// A file that exists but fails to parse is still an error: silently
    /// ignoring a broken config hides mistakes.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

/// Write a TOML configuration atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, target: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;

    let temp_path = target.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;

    if let Err(e) = std::fs::rename(&temp_path, target) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(Error::Io(e));
    }

    info!("Wrote TOML configuration to {:?}", target);
    Ok(())
}

/// Get default configuration file path for the platform
///
/// `<config_dir>/isongify/config.toml`, e.g. `~/.config/isongify/config.toml` on Linux.
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("isongify").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// Catalogue file resolution in priority order:
/// 1. Explicit argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. Compiled default (fallback)
pub fn resolve_data_file(explicit: Option<&Path>, toml_config: Option<&TomlConfig>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_FILE_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = toml_config.and_then(|c| c.data_file.as_ref()) {
        return path.clone();
    }

    PathBuf::from(DEFAULT_DATA_FILE)
}
