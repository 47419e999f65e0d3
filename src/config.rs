use crate::error::ConfigError;
use crate::generation::{GenerationSettings, HttpTransport};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
const APP_DIR: &str = "formsmith";
const CONFIG_FILE: &str = "config.yaml";

/// Settings file contents. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let generation = GenerationSettings::default();
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: generation.model,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            temperature: generation.temperature,
            max_tokens: generation.max_tokens,
            timeout_secs: 60,
            data_dir: None,
        }
    }
}

/// Values given on the command line; they win over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

impl AppConfig {
    /// Reads `path`, or the default location when `None`. A missing default
    /// file yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(dir) = overrides.data_dir {
            self.data_dir = Some(dir);
        }
        if let Some(endpoint) = overrides.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(model) = overrides.model {
            self.model = model;
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        })
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.data_dir().join("templates")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("formsmith.log")
    }

    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub fn transport(&self) -> HttpTransport {
        let api_key = self.api_key();
        if api_key.is_none() {
            tracing::warn!(var = %self.api_key_env, "no API key in environment");
        }
        HttpTransport::new(
            self.endpoint.clone(),
            api_key,
            Duration::from_secs(self.timeout_secs),
        )
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
