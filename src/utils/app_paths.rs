use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;

pub struct AppPaths;

impl AppPaths {
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Cannot determine data directory"))?
            .join("campus-kit");

        fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    /// Default home of `FileStorage` entries
    pub fn storage_dir() -> Result<PathBuf> {
        let storage_dir = Self::data_dir()?.join("storage");
        fs::create_dir_all(&storage_dir)?;
        Ok(storage_dir)
    }

    pub fn config_file() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("campus-kit").join("config.toml"))
    }
}
