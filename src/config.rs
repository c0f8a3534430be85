//! Service configuration.
//!
//! All fields have serde defaults so a partial (or absent) config file is
//! fine. The Gemini credential may come from the config file or from the
//! `GEMINI_API_KEY` / `GOOGLE_API_KEY` environment variables — resolution
//! order lives in [`crate::providers::gemini::GeminiAuth`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default HTTP port, matching the service's original deployment.
const DEFAULT_PORT: u16 = 5000;

/// Default Gemini model for answer generation.
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default minimum spacing between remote calls, in seconds.
const DEFAULT_MIN_REQUEST_INTERVAL_SECS: u64 = 1;

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bind address.
    pub bind: String,
    /// HTTP port.
    pub port: u16,
    /// Gemini model name.
    pub model: String,
    /// Explicit Gemini API key. Takes priority over environment variables.
    pub api_key: Option<String>,
    /// Answer cache file. Defaults to `~/.gatewise/cache/answers.json`.
    pub cache_path: Option<PathBuf>,
    /// Directory of static landing-page files. When unset, a built-in
    /// page is served at `/`.
    pub static_dir: Option<PathBuf>,
    /// Minimum spacing between remote inference calls, in seconds.
    pub min_request_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            cache_path: None,
            static_dir: None,
            min_request_interval_secs: DEFAULT_MIN_REQUEST_INTERVAL_SECS,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Resolve the answer cache file path.
    ///
    /// Uses the configured path when set, otherwise
    /// `~/.gatewise/cache/answers.json` (falling back to the current
    /// directory when no home directory exists).
    pub fn cache_file(&self) -> PathBuf {
        if let Some(path) = &self.cache_path {
            return path.clone();
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gatewise")
            .join("cache")
            .join("answers.json")
    }
}
