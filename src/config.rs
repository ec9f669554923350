use async_trait::async_trait;
use dashmap::DashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::{env, fs, path::PathBuf};
use tracing::{error, info};

/// Keys the editor core reads.
pub const STORAGE_URL_KEY: &str = "REPLYFLOW_STORAGE_URL";
pub const CATALOG_URL_KEY: &str = "REPLYFLOW_CATALOG_URL";
pub const BUSINESS_ID_KEY: &str = "REPLYFLOW_BUSINESS_ID";

pub type ConfigStore = Arc<dyn ConfigStoreType>;

/// Configuration source for service endpoints and the active business.
#[async_trait]
pub trait ConfigStoreType: Send + Sync + Debug {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str) -> Result<(), String>;
    async fn keys(&self) -> Vec<String>;
}

/// Process environment, optionally seeded from a `.env` file.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    env_file: PathBuf,
}

impl EnvConfig {
    pub fn new(env_file: PathBuf) -> Arc<Self> {
        if env_file.exists() {
            dotenvy::from_path(&env_file).ok();
            info!("Loaded .env from {}", env_file.display());
        } else {
            error!("could not load .env from {}", env_file.display())
        }
        Arc::new(Self { env_file })
    }
}

#[async_trait]
impl ConfigStoreType for EnvConfig {
    async fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), String> {
        unsafe {
            env::set_var(key, value);
        }
        // keep the .env file in sync
        let content = fs::read_to_string(&self.env_file).unwrap_or_default();
        let mut lines: Vec<String> = Vec::new();
        let mut found = false;
        for line in content.lines() {
            match line.split_once('=') {
                Some((k, _)) if k.trim() == key => {
                    lines.push(format!("{key}={value}"));
                    found = true;
                }
                _ => lines.push(line.to_string()),
            }
        }
        if !found {
            lines.push(format!("{key}={value}"));
        }
        fs::write(&self.env_file, lines.join("\n")).map_err(|e| e.to_string())
    }

    async fn keys(&self) -> Vec<String> {
        env::vars().map(|(k, _)| k).collect()
    }
}

/// In-memory map, used by tests.
#[derive(Debug, Default)]
pub struct MapConfig {
    entries: DashMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl ConfigStoreType for MapConfig {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.clone())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn map_config_round_trips() {
        let config = MapConfig::new();
        assert_eq!(config.get(BUSINESS_ID_KEY).await, None);
        config.set(BUSINESS_ID_KEY, "biz-1").await.unwrap();
        assert_eq!(config.get(BUSINESS_ID_KEY).await.as_deref(), Some("biz-1"));
        assert!(config.keys().await.contains(&BUSINESS_ID_KEY.to_string()));
    }

    #[tokio::test]
    async fn env_config_persists_to_the_env_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let env_file = dir.path().join(".env");
        std::fs::write(&env_file, "EXISTING=1\n").unwrap();

        let config = EnvConfig::new(env_file.clone());
        config.set("REPLYFLOW_TEST_KEY", "abc").await.unwrap();

        let content = std::fs::read_to_string(&env_file).unwrap();
        assert!(content.contains("EXISTING=1"));
        assert!(content.contains("REPLYFLOW_TEST_KEY=abc"));
    }
}
