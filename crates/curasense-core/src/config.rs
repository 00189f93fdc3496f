//! AI capability configuration.
//!
//! Configuration priority: ~/.config/curasense/secret.json > environment
//! variables. The secret file is read-only plaintext JSON and should carry
//! restrictive permissions (e.g. 600 on Unix); API keys are never logged.

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CuraError, Result};

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Root of the secret.json file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretConfig {
    pub gemini: Option<GeminiSecret>,
}

/// Gemini API credentials and model override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSecret {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Resolved configuration for the external AI capability.
///
/// Constructed once at process start and read-only thereafter.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub model: String,
    pub request_timeout_secs: u64,
}

impl AiConfig {
    /// Loads configuration from ~/.config/curasense/secret.json or
    /// environment variables.
    ///
    /// Priority:
    /// 1. ~/.config/curasense/secret.json
    /// 2. Environment variables (GEMINI_API_KEY, GEMINI_MODEL_NAME)
    ///
    /// Model name defaults to `gemini-2.0-flash` if not specified.
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::secret_file_path() {
            if path.exists() {
                let secrets = Self::load_secret_file(&path)?;
                if let Some(gemini) = secrets.gemini {
                    let model = gemini
                        .model_name
                        .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
                    return Ok(Self::new(gemini.api_key, model));
                }
            }
        }

        let api_key = env::var("GEMINI_API_KEY").map_err(|_| {
            CuraError::config(
                "GEMINI_API_KEY not found in ~/.config/curasense/secret.json or environment variables",
            )
        })?;
        let model =
            env::var("GEMINI_MODEL_NAME").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        Ok(Self::new(api_key, model))
    }

    /// Creates a configuration with the default request timeout.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Overrides the request timeout after construction.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    fn secret_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("curasense").join("secret.json"))
    }

    /// Parses a secret.json file into [`SecretConfig`].
    pub fn load_secret_file(path: &PathBuf) -> Result<SecretConfig> {
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }
}
