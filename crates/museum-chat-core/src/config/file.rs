//! YAML configuration file
//!
//! Lives at `<config dir>/museum-chat/config.yaml`
//! (`~/.config` on Linux, `~/Library/Application Support` on macOS).

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::settings::AppConfig;
use super::traits::{ConfigProvider, ConfigResult};

pub struct FileConfigProvider {
    path: PathBuf,
    cache: RwLock<Option<AppConfig>>,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    /// The user-level config file
    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("museum-chat").join("config.yaml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read(&self) -> ConfigResult<AppConfig> {
        if !self.path.exists() {
            return Ok(AppConfig::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Drop the cached copy and read the file again
    pub fn reload(&self) -> ConfigResult<AppConfig> {
        let config = self.read()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("exists", &self.exists())
            .finish()
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn load(&self) -> ConfigResult<AppConfig> {
        if let Some(config) = self.cache.read().as_ref() {
            return Ok(config.clone());
        }
        self.reload()
    }

    async fn save(&self, config: &AppConfig) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_yaml::to_string(config)?)?;
        *self.cache.write() = Some(config.clone());
        Ok(())
    }
}
