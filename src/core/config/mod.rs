//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order; the first existing file wins:
//! 1. `$SMDX_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/smdx/config.toml`
//! 3. `~/.smdx/config.toml`
//!
//! Missing files are not an error; defaults apply.
//!
//! # Example
//!
//! ```
//! use smdx::core::config::Config;
//! use smdx::core::resolve::UnresolvedPolicy;
//!
//! let config = Config::from_toml_str("[resolve]\non_unresolved = \"error\"\n").unwrap();
//! assert_eq!(config.on_unresolved(), UnresolvedPolicy::Error);
//! assert!(!config.report_ambiguous());
//! ```

pub mod schema;

pub use schema::{ConfigFile, ResolveSection};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::resolve::{LookupStrategy, ResolveOptions, UnresolvedPolicy};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SMDX_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Loaded configuration with defaults applied on access.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: ConfigFile,
    /// Path the configuration was loaded from (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::locate() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(path = %path.display(), "loaded config");
        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<string>"),
            message: e.to_string(),
        })?;
        Ok(Self { file, path: None })
    }

    fn locate() -> Option<PathBuf> {
        // 1. $SMDX_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. $XDG_CONFIG_HOME/smdx/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("smdx/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. ~/.smdx/config.toml
        dirs::home_dir()
            .map(|home| home.join(".smdx/config.toml"))
            .filter(|path| path.exists())
    }

    /// Path the configuration was loaded from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn resolve_section(&self) -> Option<&ResolveSection> {
        self.file.resolve.as_ref()
    }

    /// Unresolved-serial policy (default: warn).
    pub fn on_unresolved(&self) -> UnresolvedPolicy {
        self.resolve_section()
            .and_then(|r| r.on_unresolved)
            .unwrap_or_default()
    }

    /// Lookup strategy (default: indexed).
    pub fn lookup(&self) -> LookupStrategy {
        self.resolve_section()
            .and_then(|r| r.lookup)
            .unwrap_or_default()
    }

    /// Whether to report ambiguous polymorphic matches (default: false).
    pub fn report_ambiguous(&self) -> bool {
        self.resolve_section()
            .and_then(|r| r.report_ambiguous)
            .unwrap_or(false)
    }

    /// Runtime options for [`crate::core::document::Document::resolve_all`].
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            on_unresolved: self.on_unresolved(),
            lookup: self.lookup(),
            report_ambiguous: self.report_ambiguous(),
        }
    }
}
