//! Client configuration
//!
//! Loaded from a TOML file found by [`ClientConfig::find_config`]; every
//! section and key is optional.
//!
//! ```toml
//! [apply]
//! sequential = true
//!
//! [tree]
//! fill_depth = 2
//!
//! [logging]
//! profile = "production"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SnapError};
use crate::logging_facility::Profile;

/// Environment variable holding a full path to a config file
pub const ENV_CONFIG_PATH: &str = "PVSNAP_CFG";

/// File names tried in each config directory, in order
pub const CONFIG_FILENAMES: [&str; 2] = [".pvsnap.toml", "pvsnap.toml"];

/// Root configuration for a [`crate::Client`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub apply: ApplyConfig,
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Apply engine settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApplyConfig {
    /// Write one PV at a time, stopping at the first failure
    #[serde(default)]
    pub sequential: bool,
}

/// Lazy tree settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Levels resolved when a node is expanded
    #[serde(default = "default_fill_depth")]
    pub fill_depth: usize,
}

fn default_fill_depth() -> usize {
    2
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            fill_depth: default_fill_depth(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub profile: Profile,
}

impl ClientConfig {
    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns `Config` if the document is not valid TOML or has wrongly
    /// typed keys.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| SnapError::Config {
            message: format!("invalid config: {}", e),
        })
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| SnapError::Config {
            message: format!("failed to read config at {}: {}", path.display(), e),
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded client config");
        Ok(config)
    }

    /// Locate a config file
    ///
    /// Searches, in order: `$PVSNAP_CFG`, then `.pvsnap.toml` / `pvsnap.toml`
    /// in `$XDG_CONFIG_HOME` (or the current directory when unset), then in
    /// `~/.config`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if no file is found.
    pub fn find_config() -> Result<PathBuf> {
        let explicit = std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from);
        let mut search_dirs = vec![std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))];
        if let Some(home) = dirs::home_dir() {
            search_dirs.push(home.join(".config"));
        }
        find_config_in(explicit, &search_dirs).ok_or_else(|| SnapError::Config {
            message: "no pvsnap configuration file found".to_string(),
        })
    }

    /// Load the discovered config file, or defaults when there is none
    ///
    /// # Errors
    ///
    /// Returns `Config` if a file was found but cannot be loaded.
    pub fn load_or_default() -> Result<Self> {
        match Self::find_config() {
            Ok(path) => Self::load(&path),
            Err(_) => {
                tracing::info!("client config not found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Config discovery over explicit search locations
///
/// An explicit path wins without an existence check.
pub fn find_config_in(explicit: Option<PathBuf>, dirs: &[PathBuf]) -> Option<PathBuf> {
    if let Some(path) = explicit {
        tracing::debug!(path = %path.display(), "using ${}", ENV_CONFIG_PATH);
        return Some(path);
    }
    dirs.iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}
