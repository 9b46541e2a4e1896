//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where converted recordings are cached.
    pub cache_dir: PathBuf,

    /// Default conversion settings.
    pub conversion: ConversionDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default parameters for dataset-to-recording conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionDefaults {
    /// Columns that set a timeline coordinate instead of being logged.
    /// Applied in this order for every row.
    pub time_like_columns: Vec<String>,

    /// Dataset bookkeeping columns that are never logged.
    pub ignored_columns: Vec<String>,

    /// Column holding the episode index used for episode selection.
    pub episode_column: String,

    /// Application id written into recording headers.
    pub application_id: String,

    /// Maximum rate of progress reports (Hz).
    pub progress_report_hz: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "rowcast=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: dirs_default_cache(),
            conversion: ConversionDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ConversionDefaults {
    fn default() -> Self {
        Self {
            time_like_columns: ["index", "frame_id", "timestamp"]
                .into_iter()
                .map(String::from)
                .collect(),
            ignored_columns: [
                "episode_data_index_from",
                "episode_data_index_to",
                "episode_id",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            episode_column: "episode_index".to_string(),
            application_id: "rowcast_dataset".to_string(),
            progress_report_hz: 4,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("rowcast").join("config.json")
}

/// Default recording cache directory.
fn dirs_default_cache() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("rowcast").join("recordings")
}
