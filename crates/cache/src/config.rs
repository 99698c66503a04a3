//! Cache configuration with precedence and validation
//!
//! Configuration is resolved in three layers: built-in defaults, an optional
//! JSON file, then `DISKLRU_*` environment variables.

use crate::errors::{Error, RecoveryHint, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default size budget (10 MiB)
pub const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;

/// Redundant journal operations tolerated before compaction
pub const DEFAULT_REBUILD_THRESHOLD: usize = 2000;

/// How trim and journal compaction are run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupMode {
    /// On a dedicated worker thread, at most one request queued
    #[default]
    Background,
    /// Synchronously, inside the operation that triggered it
    Inline,
}

impl std::str::FromStr for CleanupMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "background" => Ok(Self::Background),
            "inline" => Ok(Self::Inline),
            other => Err(Error::Configuration {
                message: format!("Unknown cleanup mode: {other}"),
                recovery_hint: RecoveryHint::UseDefault {
                    value: "background".to_string(),
                },
            }),
        }
    }
}

/// Configuration for one cache directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory owned by the cache
    pub directory: PathBuf,
    /// Caller-supplied version; a mismatch discards the cache
    pub app_version: u32,
    /// Number of value slots per entry
    pub value_count: usize,
    /// Size budget in bytes
    pub max_size: u64,
    /// Journal compaction threshold
    pub rebuild_threshold: usize,
    /// Where cleanup runs
    pub cleanup_mode: CleanupMode,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("disklru"),
            app_version: 1,
            value_count: 1,
            max_size: DEFAULT_MAX_SIZE,
            rebuild_threshold: DEFAULT_REBUILD_THRESHOLD,
            cleanup_mode: CleanupMode::Background,
        }
    }
}

impl CacheConfig {
    /// Configuration for `directory` with every other field defaulted
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.value_count == 0 {
            return Err(Error::Configuration {
                message: "value_count must be at least 1".to_string(),
                recovery_hint: RecoveryHint::UseDefault {
                    value: "1".to_string(),
                },
            });
        }

        if self.rebuild_threshold == 0 {
            return Err(Error::Configuration {
                message: "rebuild_threshold must be at least 1".to_string(),
                recovery_hint: RecoveryHint::UseDefault {
                    value: DEFAULT_REBUILD_THRESHOLD.to_string(),
                },
            });
        }

        if self.directory.as_os_str().is_empty() {
            return Err(Error::Configuration {
                message: "cache directory must not be empty".to_string(),
                recovery_hint: RecoveryHint::Manual {
                    instructions: "Set DISKLRU_DIR or pass a directory".to_string(),
                },
            });
        }

        Ok(())
    }
}

/// Builder for creating cache configurations
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
        }
    }

    /// Set the cache directory
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.directory = directory.into();
        self
    }

    /// Set the application version recorded in the journal header
    pub fn with_app_version(mut self, app_version: u32) -> Self {
        self.config.app_version = app_version;
        self
    }

    /// Set the number of value slots per entry
    pub fn with_value_count(mut self, value_count: usize) -> Self {
        self.config.value_count = value_count;
        self
    }

    /// Set maximum cache size
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.config.max_size = max_size;
        self
    }

    /// Set the journal compaction threshold
    pub fn with_rebuild_threshold(mut self, threshold: usize) -> Self {
        self.config.rebuild_threshold = threshold;
        self
    }

    /// Set where cleanup runs
    pub fn with_cleanup_mode(mut self, mode: CleanupMode) -> Self {
        self.config.cleanup_mode = mode;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<CacheConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for CacheConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration loader that handles precedence
pub struct CacheConfigLoader;

impl CacheConfigLoader {
    /// Load defaults, then `file` if it exists, then environment overrides
    pub fn load(file: Option<&Path>) -> Result<CacheConfig> {
        let mut config = match file {
            Some(path) if path.exists() => Self::load_from_file(path)?,
            Some(path) => {
                tracing::debug!("Config file {} not found, using defaults", path.display());
                CacheConfig::default()
            }
            None => CacheConfig::default(),
        };

        Self::apply_env(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file; absent fields keep their defaults
    pub fn load_from_file(path: &Path) -> Result<CacheConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            operation: "read config file",
            source: e,
            recovery_hint: RecoveryHint::CheckPermissions {
                path: path.to_path_buf(),
            },
        })?;

        serde_json::from_str(&content).map_err(|e| Error::Serialization {
            path: path.to_path_buf(),
            source: Box::new(e),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Check config file syntax".to_string(),
            },
        })
    }

    /// Override fields from `DISKLRU_*` environment variables
    fn apply_env(config: &mut CacheConfig) -> Result<()> {
        if let Ok(dir) = std::env::var("DISKLRU_DIR") {
            config.directory = PathBuf::from(dir);
        }

        if let Some(app_version) = Self::parse_env::<u32>("DISKLRU_APP_VERSION")? {
            config.app_version = app_version;
        }

        if let Some(value_count) = Self::parse_env::<usize>("DISKLRU_VALUE_COUNT")? {
            config.value_count = value_count;
        }

        if let Some(max_size) = Self::parse_env::<u64>("DISKLRU_MAX_SIZE")? {
            config.max_size = max_size;
        }

        if let Some(threshold) = Self::parse_env::<usize>("DISKLRU_REBUILD_THRESHOLD")? {
            config.rebuild_threshold = threshold;
        }

        if let Ok(mode) = std::env::var("DISKLRU_CLEANUP") {
            config.cleanup_mode = mode.parse()?;
        }

        Ok(())
    }

    fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
        match std::env::var(name) {
            Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| Error::Configuration {
                message: format!("{name}={raw} is not a valid number"),
                recovery_hint: RecoveryHint::Manual {
                    instructions: format!("Unset {name} or set it to a non-negative integer"),
                },
            }),
            Err(_) => Ok(None),
        }
    }
}
