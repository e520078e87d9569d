use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::render::{DEFAULT_LANGUAGE, RenderOptions};

/// Defaults compiled into the binary, validated by `build.rs`.
const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "CANVAS_API_URL";

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub render: RenderConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1337".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub stale_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { stale_secs: 300 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub default_language: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    /// Where the session is persisted. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

impl Config {
    /// The bundled defaults.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file, or the bundled defaults if there is none.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::compiled_default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Default location of the user config file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("canvas")
            .join("config.toml")
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_env_from(|key| env::var(key).ok())
    }

    /// Apply overrides from variables resolved by `lookup`.
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
        self
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            default_language: self.render.default_language.clone(),
        }
    }

    /// Location of the persisted session.
    pub fn session_path(&self) -> PathBuf {
        self.session.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("canvas")
                .join("session.json")
        })
    }
}
