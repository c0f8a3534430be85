//! Native Gemini provider.
//!
//! Auth priority: config key → GEMINI_API_KEY → GOOGLE_API_KEY.
//!
//! Thinking model support: newer Gemini models return parts tagged
//! `thought: true`. This provider filters those out and only returns the
//! final non-thought text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::Result;

use super::{classify_provider_error, InferenceProvider};

/// Gemini v1beta REST API base.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Authentication for the Gemini REST API — an API key sent as a `?key=`
/// query parameter.
pub struct GeminiAuth(String);

impl std::fmt::Debug for GeminiAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GeminiAuth([REDACTED])")
    }
}

impl GeminiAuth {
    /// Resolve the API key in priority order.
    ///
    /// 1. `explicit_key` — value from the config file
    /// 2. `GEMINI_API_KEY` environment variable
    /// 3. `GOOGLE_API_KEY` environment variable
    pub fn resolve(explicit_key: Option<&str>) -> Option<Self> {
        if let Some(k) = explicit_key.filter(|k| !k.is_empty()) {
            return Some(Self(k.to_string()));
        }
        std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|k| !k.is_empty())
            .map(Self)
    }

    /// Name of the source an API key would resolve from, for diagnostics.
    /// Returns `None` when no credential is available anywhere.
    pub fn source(explicit_key: Option<&str>) -> Option<&'static str> {
        if explicit_key.filter(|k| !k.is_empty()).is_some() {
            return Some("config");
        }
        if std::env::var("GEMINI_API_KEY").is_ok_and(|k| !k.is_empty()) {
            return Some("GEMINI_API_KEY");
        }
        if std::env::var("GOOGLE_API_KEY").is_ok_and(|k| !k.is_empty()) {
            return Some("GOOGLE_API_KEY");
        }
        None
    }
}

/// Provider that speaks the Gemini REST API directly.
pub struct GeminiProvider {
    auth: GeminiAuth,
    model: String,
    client: Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("auth", &self.auth)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiProvider {
    /// Build a provider with an explicit API key.
    pub fn new_with_key(api_key: &str, model: &str) -> Self {
        Self {
            auth: GeminiAuth(api_key.to_string()),
            model: model.to_string(),
            client: Self::build_client(),
        }
    }

    /// Build from config, resolving the key in priority order.
    ///
    /// Returns `None` when no credential is available — the service then
    /// runs fallback-only.
    pub fn from_config(api_key: Option<&str>, model: &str) -> Option<Self> {
        let auth = GeminiAuth::resolve(api_key)?;
        Some(Self {
            auth,
            model: model.to_string(),
            client: Self::build_client(),
        })
    }

    fn build_client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client")
    }

    /// Build a single-turn `generateContent` request body.
    fn build_request_body(system_prompt: &str, query: &str) -> Value {
        json!({
            "systemInstruction": {
                "parts": [{ "text": system_prompt }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": query }]
            }],
            "generationConfig": {
                "temperature": 0.7,
                "maxOutputTokens": 1024
            }
        })
    }

    /// Extract final answer text from a Gemini API response.
    ///
    /// Parts tagged `"thought": true` are intermediate reasoning and get
    /// filtered out. If only thought parts exist (unusual), they are
    /// returned so the caller always gets *something*.
    fn extract_text(response: &Value) -> Option<String> {
        let parts = response["candidates"][0]["content"]["parts"].as_array()?;

        let final_parts: Vec<&str> = parts
            .iter()
            .filter(|p| !p["thought"].as_bool().unwrap_or(false))
            .filter_map(|p| p["text"].as_str())
            .collect();

        if !final_parts.is_empty() {
            return Some(final_parts.join(""));
        }

        let thought_parts: Vec<&str> = parts.iter().filter_map(|p| p["text"].as_str()).collect();
        if !thought_parts.is_empty() {
            Some(thought_parts.join(""))
        } else {
            None
        }
    }

    /// Full API URL for `generateContent` on the configured model.
    fn api_url(&self) -> String {
        format!("{}/models/{}:generateContent", GEMINI_API_BASE, self.model)
    }
}

#[async_trait]
impl InferenceProvider for GeminiProvider {
    async fn generate(&self, system_prompt: &str, query: &str) -> Result<String> {
        let body = Self::build_request_body(system_prompt, query);

        debug!(model = %self.model, "Gemini request");

        let response = self
            .client
            .post(self.api_url())
            .header("Content-Type", "application/json")
            .query(&[("key", self.auth.0.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_provider_error(&format!("Gemini request failed: {}", e)))?;

        if response.status().is_success() {
            let json: Value = response.json().await.map_err(|e| {
                classify_provider_error(&format!("Failed to parse Gemini response: {}", e))
            })?;
            return Self::extract_text(&json).ok_or_else(|| {
                classify_provider_error("Gemini response contained no answer text")
            });
        }

        let status = response.status().as_u16();
        let error_text = response.text().await.unwrap_or_default();

        // Prefer the message field from the Gemini error body when it parses.
        let description = serde_json::from_str::<Value>(&error_text)
            .ok()
            .and_then(|v| {
                v["error"]["message"]
                    .as_str()
                    .map(|s| format!("Gemini API error ({}): {}", status, s))
            })
            .unwrap_or_else(|| format!("Gemini API error ({}): {}", status, error_text));

        Err(classify_provider_error(&description))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
