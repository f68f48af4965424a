//! Configuration file support for rxdesk.
//!
//! Settings come from the global `config.toml` (written by `rxdesk init`),
//! then `rxdesk.toml` in the working directory, then command-line flags.
//! Each layer overrides the one before it field by field.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use rxdesk_logging::LogFormat;
use rxdesk_records::StockThresholds;

use crate::storage::Backend;

/// The project config file name
pub const CONFIG_FILE_NAME: &str = "rxdesk.toml";

/// Directory under the user config dir holding the global config
pub const GLOBAL_CONFIG_DIR: &str = "rxdesk";

/// The global config file name
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Log level used when neither config nor `-v` says otherwise
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// One configuration file, global or project.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the record slots live
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    pub backend: Option<Backend>,
    /// Slot directory for `json`, database file for `sqlite`
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InventoryConfig {
    pub low_stock_threshold: Option<u32>,
    pub medium_stock_threshold: Option<u32>,
    pub expiring_within_days: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
    /// Directory for daily rolling diagnostic logs
    pub dir: Option<PathBuf>,
    /// JSON lines file receiving every audit event
    pub audit_file: Option<PathBuf>,
}

impl FileConfig {
    /// Path of the global config file, if the platform has a config dir.
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
    }

    /// Load a config file.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }

    /// Load the global file and the working directory's project file,
    /// project fields winning.
    pub fn load_layered(global: Option<&Path>, working_dir: &Path) -> Result<Self> {
        let global = match global {
            Some(path) => Self::load_from(path)?.unwrap_or_default(),
            None => Self::default(),
        };
        let project = Self::load_from(&working_dir.join(CONFIG_FILE_NAME))?.unwrap_or_default();

        Ok(global.overlay(project))
    }

    /// Fields set in `over` replace the ones here.
    pub fn overlay(self, over: FileConfig) -> FileConfig {
        FileConfig {
            storage: StorageConfig {
                backend: over.storage.backend.or(self.storage.backend),
                path: over.storage.path.or(self.storage.path),
            },
            inventory: InventoryConfig {
                low_stock_threshold: over
                    .inventory
                    .low_stock_threshold
                    .or(self.inventory.low_stock_threshold),
                medium_stock_threshold: over
                    .inventory
                    .medium_stock_threshold
                    .or(self.inventory.medium_stock_threshold),
                expiring_within_days: over
                    .inventory
                    .expiring_within_days
                    .or(self.inventory.expiring_within_days),
            },
            logging: LoggingConfig {
                level: over.logging.level.or(self.logging.level),
                format: over.logging.format.or(self.logging.format),
                dir: over.logging.dir.or(self.logging.dir),
                audit_file: over.logging.audit_file.or(self.logging.audit_file),
            },
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub backend: Option<Backend>,
    pub data: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
    /// Number of `-v` flags
    pub verbose: u8,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend: Backend,
    pub data_path: Option<PathBuf>,
    pub thresholds: StockThresholds,
    pub log_level: String,
    pub log_format: LogFormat,
    pub log_dir: Option<PathBuf>,
    pub audit_file: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(config: FileConfig, overrides: &Overrides) -> Result<Self> {
        let defaults = StockThresholds::default();
        let thresholds = StockThresholds {
            low: config.inventory.low_stock_threshold.unwrap_or(defaults.low),
            medium: config
                .inventory
                .medium_stock_threshold
                .unwrap_or(defaults.medium),
            expiring_within_days: config
                .inventory
                .expiring_within_days
                .unwrap_or(defaults.expiring_within_days),
        };
        if thresholds.low > thresholds.medium {
            anyhow::bail!(
                "low_stock_threshold ({}) must not exceed medium_stock_threshold ({})",
                thresholds.low,
                thresholds.medium
            );
        }

        let log_format = match overrides.log_format {
            Some(format) => format,
            None => match config.logging.format.as_deref() {
                Some(name) => name.parse().map_err(|e: String| anyhow::anyhow!(e))?,
                None => LogFormat::default(),
            },
        };

        let log_level = match overrides.verbose {
            0 => config
                .logging
                .level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        };

        Ok(Self {
            backend: overrides
                .backend
                .or(config.storage.backend)
                .unwrap_or_default(),
            data_path: overrides.data.clone().or(config.storage.path),
            thresholds,
            log_level,
            log_format,
            log_dir: config.logging.dir,
            audit_file: config.logging.audit_file,
        })
    }
}
