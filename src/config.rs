use crate::query::ApiContext;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub api: ApiRules,
    pub logging: LoggingRules,
}

/// The API queries are scoped to when no `--api-path` is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiRules {
    pub virtual_host_path: Option<String>,
}

impl ApiContext for ApiRules {
    fn first_virtual_host_path(&self) -> Option<&str> {
        self.virtual_host_path.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingRules {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingRules {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<CodecConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<CodecConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<CodecConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_config() -> &'static CodecConfig {
    static DEFAULT_CONFIG: LazyLock<CodecConfig> = LazyLock::new(CodecConfig::default);
    &DEFAULT_CONFIG
}
