use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::data::pagination::DEFAULT_PAGE_SIZE;
use crate::utils::app_paths::AppPaths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pagination: PaginationConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Items per page
    pub page_size: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for persisted values (None = application data directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Remember query, sort and page per catalog file between runs
    pub remember_view: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when RUST_LOG is unset
    pub filter: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        Self::from_toml(&fs::read_to_string(&config_path)?)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.pagination.page_size = config.pagination.page_size.max(1);
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        AppPaths::config_file()
    }

    /// Storage directory, falling back to the application data directory
    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.storage.dir {
            Some(dir) => Ok(dir.clone()),
            None => AppPaths::storage_dir(),
        }
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# campus-kit configuration
# Location: ~/.config/campus-kit/config.toml (Linux)
#           ~/Library/Application Support/campus-kit/config.toml (macOS)
#           %APPDATA%\campus-kit\config.toml (Windows)

[pagination]
# Items shown per page
page_size = 10

[storage]
# Directory for persisted values (leave commented to use the data directory)
# dir = "/path/to/storage"

# Remember query, sort and page per catalog file between runs
remember_view = false

[logging]
# Used when RUST_LOG is not set, e.g. "info" or "campus_kit=debug"
filter = "warn"
"#
        .to_string()
    }
}
