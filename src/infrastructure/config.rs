//! Configuration infrastructure
//!
//! Settings live in a single JSON file under the user config directory.
//! Every section has defaults, so a partial file is valid. The binary falls
//! back to the defaults with a warning when the file is missing or corrupt,
//! applies command-line flags on top and can write the result back.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::application::BatchConfiguration;
use crate::domain::PurgeResult;
use crate::infrastructure::listing_extractor::{ExportEncoding, ListingSelectors};
use crate::infrastructure::vk_client::VkApiConfig;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub batch: BatchSettings,
    pub api: VkApiConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Concurrency and pacing of delete calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Calls in flight before the batch is awaited
    pub max_tasks: usize,

    /// Fixed pause between batches, in seconds
    pub timeout_seconds: f64,

    /// `[min, max]` seconds; replaces the fixed pause when set
    pub random_timeout: Option<[f64; 2]>,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_tasks: defaults::MAX_TASKS,
            timeout_seconds: defaults::TIMEOUT_SECONDS,
            random_timeout: None,
        }
    }
}

impl BatchSettings {
    /// Validated engine configuration
    pub fn to_batch_configuration(&self) -> PurgeResult<BatchConfiguration> {
        BatchConfiguration::from_settings(
            self.max_tasks,
            self.timeout_seconds,
            self.random_timeout.map(|[min, max]| (min, max)),
        )
    }
}

/// How exported listing pages are read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub encoding: ExportEncoding,
    pub selectors: ListingSelectors,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    pub level: String,

    /// Diagnostics on stderr
    pub console_output: bool,

    pub file_output: bool,

    pub json_format: bool,

    /// Directory of the log file; the user data directory when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            console_output: true,
            file_output: false,
            json_format: false,
            log_dir: None,
        }
    }
}

/// Configuration file manager
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Manager for the file in the user config directory
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Read the file; `Ok(None)` when it does not exist.
    pub async fn try_load_config(&self) -> Result<Option<AppConfig>> {
        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Cannot read configuration {:?}", self.config_path));
            }
        };

        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration {:?}", self.config_path))?;
        Ok(Some(config))
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Default values
pub mod defaults {
    pub const APP_DIR_NAME: &str = "vk-purge";
    pub const CONFIG_FILE_NAME: &str = "config.json";
    pub const LOG_FILE_NAME: &str = "vk-purge.log";

    /// One call at a time, the pace the archive owner would click at
    pub const MAX_TASKS: usize = 1;
    pub const TIMEOUT_SECONDS: f64 = 1.0;

    pub const LOG_LEVEL: &str = "info";
}
