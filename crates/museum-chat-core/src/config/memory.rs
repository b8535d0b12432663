//! In-memory configuration provider

use async_trait::async_trait;
use parking_lot::RwLock;

use super::settings::AppConfig;
use super::traits::{ConfigProvider, ConfigResult};

#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    config: RwLock<AppConfig>,
}

impl MemoryConfigProvider {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn load(&self) -> ConfigResult<AppConfig> {
        Ok(self.config.read().clone())
    }

    async fn save(&self, config: &AppConfig) -> ConfigResult<()> {
        *self.config.write() = config.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmSettings;

    #[tokio::test]
    async fn test_save_then_load() {
        let provider = MemoryConfigProvider::default();
        assert_eq!(provider.load().await.unwrap(), AppConfig::default());

        let mut config = AppConfig::default();
        config.llm = LlmSettings::new("mock", "mock-echo");
        provider.save(&config).await.unwrap();

        assert_eq!(provider.load().await.unwrap().llm.provider, "mock");
    }
}
