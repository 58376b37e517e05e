use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{load_yaml, parse_yaml, ConfigError};

use super::file_store::FileStore;
use super::store::{MemoryStore, UnitStore};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectorConfig {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        WebConfig {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:9000".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    #[default]
    Memory,
    File {
        base_folder: PathBuf,
    },
}

impl StoreConfig {
    pub fn open(&self) -> Arc<dyn UnitStore> {
        match self {
            StoreConfig::Memory => Arc::new(MemoryStore::new()),
            StoreConfig::File { base_folder } => Arc::new(FileStore::new(base_folder.clone())),
        }
    }
}

impl CollectorConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        load_yaml(path)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        parse_yaml(yaml)
    }
}
