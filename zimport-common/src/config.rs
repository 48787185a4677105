//! Configuration loading and settings resolution
//!
//! Bootstrap configuration comes from a TOML file. Path settings follow this
//! priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Whitelists come from the environment, then TOML, then compiled defaults.
//! A missing default config file is not an error: a warning is logged and
//! compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the temp root
pub const ENV_TEMP_DIR: &str = "ZIMPORT_TEMP_DIR";
/// Environment variable overriding the storage directory
pub const ENV_STORAGE_DIR: &str = "ZIMPORT_STORAGE_DIR";
/// Environment variable overriding the public base URL of stored files
pub const ENV_BASE_URL: &str = "ZIMPORT_BASE_URL";
/// Environment variable overriding the content-type whitelist (comma separated)
pub const ENV_MEDIA_TYPES: &str = "ZIMPORT_MEDIA_TYPES";
/// Environment variable overriding the extension whitelist (comma separated)
pub const ENV_EXTENSIONS: &str = "ZIMPORT_EXTENSIONS";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root under which per-job temp directories are created
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    /// Directory holding stored media and rewritten spreadsheets
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    /// Public URL prefix for files under `storage_dir`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Accepted sniffed content types
    #[serde(default)]
    pub media_type_whitelist: Option<Vec<String>>,

    /// Accepted file extensions (case-sensitive, without the dot)
    #[serde(default)]
    pub extension_whitelist: Option<Vec<String>>,

    /// Rows handed to the row pipeline per batch
    #[serde(default)]
    pub rows_per_batch: Option<usize>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Built-in defaults used when no other source provides a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub temp_dir: PathBuf,
    pub storage_dir: PathBuf,
    pub base_url: String,
    pub media_type_whitelist: Vec<String>,
    pub extension_whitelist: Vec<String>,
    pub rows_per_batch: usize,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was built for
    pub fn for_current_platform() -> Self {
        let storage_dir = dirs::data_local_dir()
            .map(|d| d.join("zimport").join("files"))
            .unwrap_or_else(|| PathBuf::from("./zimport_data/files"));

        Self {
            temp_dir: std::env::temp_dir().join("zimport"),
            base_url: format!("file://{}", storage_dir.display()),
            storage_dir,
            media_type_whitelist: to_strings(&[
                "application/pdf",
                "audio/mpeg",
                "audio/ogg",
                "audio/x-wav",
                "audio/x-flac",
                "image/bmp",
                "image/gif",
                "image/jpeg",
                "image/png",
                "image/tiff",
                "image/webp",
                "video/mp4",
                "video/quicktime",
                "video/webm",
            ]),
            extension_whitelist: to_strings(&[
                "pdf", "mp3", "ogg", "wav", "flac", "bmp", "gif", "jpg", "jpeg", "png", "tif",
                "tiff", "webp", "mp4", "mov", "webm",
            ]),
            rows_per_batch: 20,
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub temp_dir: Option<PathBuf>,
    pub storage_dir: Option<PathBuf>,
    pub base_url: Option<String>,
}

/// Fully resolved settings handed to the import engine
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub temp_dir: PathBuf,
    pub storage_dir: PathBuf,
    pub base_url: String,
    pub media_type_whitelist: Vec<String>,
    pub extension_whitelist: Vec<String>,
    pub rows_per_batch: usize,
    pub logging: LoggingConfig,
}

impl ImportSettings {
    /// Resolve settings from CLI → ENV → TOML → compiled defaults
    pub fn resolve(cli: &CliOverrides, toml_config: &TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        let temp_dir = cli
            .temp_dir
            .clone()
            .or_else(|| env_path(ENV_TEMP_DIR))
            .or_else(|| toml_config.temp_dir.clone())
            .unwrap_or(defaults.temp_dir);

        let storage_dir = cli
            .storage_dir
            .clone()
            .or_else(|| env_path(ENV_STORAGE_DIR))
            .or_else(|| toml_config.storage_dir.clone())
            .unwrap_or(defaults.storage_dir);

        let base_url = cli
            .base_url
            .clone()
            .or_else(|| env_string(ENV_BASE_URL))
            .or_else(|| toml_config.base_url.clone())
            .unwrap_or_else(|| format!("file://{}", storage_dir.display()));

        let media_type_whitelist = env_list(ENV_MEDIA_TYPES)
            .or_else(|| toml_config.media_type_whitelist.clone())
            .unwrap_or(defaults.media_type_whitelist);

        let extension_whitelist = env_list(ENV_EXTENSIONS)
            .or_else(|| toml_config.extension_whitelist.clone())
            .unwrap_or(defaults.extension_whitelist);

        let rows_per_batch = match toml_config.rows_per_batch {
            Some(0) => {
                warn!("rows_per_batch = 0 is invalid, using default {}", defaults.rows_per_batch);
                defaults.rows_per_batch
            }
            Some(n) => n,
            None => defaults.rows_per_batch,
        };

        Self {
            temp_dir,
            storage_dir,
            base_url: base_url.trim_end_matches('/').to_string(),
            media_type_whitelist,
            extension_whitelist,
            rows_per_batch,
            logging: toml_config.logging.clone(),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_path(name: &str) -> Option<PathBuf> {
    env_string(name).map(PathBuf::from)
}

fn env_list(name: &str) -> Option<Vec<String>> {
    env_string(name).map(|v| {
        v.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))
}

/// Configuration together with the file it came from
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    /// `None` when no config file was found and defaults are in use
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    /// Report where configuration came from
    ///
    /// Called once a subscriber is installed, since the logging settings are
    /// themselves part of the loaded configuration.
    pub fn log_source(&self) {
        match &self.source {
            Some(path) => info!("Loaded configuration from {}", path.display()),
            None => warn!("No config file found, using compiled defaults"),
        }
    }
}

/// Load configuration
///
/// An explicitly requested file must exist and parse. Without one, the
/// platform config locations are tried; finding none yields defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let source = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_file(),
    };

    let config = match &source {
        Some(path) => load_toml_config(path)?,
        None => TomlConfig::default(),
    };
    Ok(LoadedConfig { config, source })
}

/// First existing config file among the platform locations
///
/// Linux tries ~/.config/zimport/config.toml, then /etc/zimport/config.toml.
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("zimport").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/zimport/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
