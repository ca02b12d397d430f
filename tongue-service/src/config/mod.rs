use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;

use crate::services::providers::gemini::{
    GeminiConfig, DEFAULT_MODEL, DEFAULT_TEMPERATURE, GEMINI_API_BASE,
};

/// Default upload ceiling (10MB).
const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_SESSION_FILE: &str = ".tongue-session.json";

#[derive(Debug, Clone, Deserialize)]
pub struct TongueConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub upload: UploadConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    /// Optional: without it the service runs but every diagnosis fails fast.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_image_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub file: PathBuf,
}

impl TongueConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(TongueConfig {
            common: common_config,
            gemini: GeminiSettings {
                api_key: env::var("GEMINI_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
                model: get_env("GEMINI_MODEL", Some(DEFAULT_MODEL), is_prod)?,
                api_base: get_env("GEMINI_API_BASE", Some(GEMINI_API_BASE), is_prod)?,
                temperature: get_env(
                    "GEMINI_TEMPERATURE",
                    Some(&DEFAULT_TEMPERATURE.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_TEMPERATURE),
            },
            upload: UploadConfig {
                max_image_bytes: get_env(
                    "MAX_IMAGE_BYTES",
                    Some(&DEFAULT_MAX_IMAGE_BYTES.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_MAX_IMAGE_BYTES),
            },
            session: SessionConfig {
                file: PathBuf::from(get_env(
                    "SESSION_FILE",
                    Some(DEFAULT_SESSION_FILE),
                    is_prod,
                )?),
            },
        })
    }

    /// Defaults with no credential, listening on a random port.
    pub fn for_tests(session_file: PathBuf) -> Self {
        TongueConfig {
            common: core_config::Config {
                port: 0,
                ..core_config::Config::default()
            },
            gemini: GeminiSettings {
                api_key: None,
                model: DEFAULT_MODEL.to_string(),
                api_base: GEMINI_API_BASE.to_string(),
                temperature: DEFAULT_TEMPERATURE,
            },
            upload: UploadConfig {
                max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            },
            session: SessionConfig { file: session_file },
        }
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        let mut config = GeminiConfig::new(self.gemini.api_key.clone());
        config.model = self.gemini.model.clone();
        config.api_base = self.gemini.api_base.clone();
        config.temperature = self.gemini.temperature;
        config
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
