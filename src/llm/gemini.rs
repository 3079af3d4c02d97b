// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Google Generative Language (Gemini) backend over blocking HTTP.
//!
//! Calls the v1beta REST API directly: `models/{model}:generateContent` for
//! completions and `models` for the model list. HTTP statuses and block
//! reasons are mapped onto [`LlmError`] kinds so the planner can decide
//! whether a retry can help. The client itself never retries.

use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{GeneratedText, LlmError, SamplingParams, TextGenerator};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Offered when the model list cannot be fetched
pub const FALLBACK_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-2.5-flash-lite",
    "gemini-2.0-flash",
];

/// Blocking Gemini client
pub struct GeminiClient {
    api_key: String,
    model: String,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    /// Creates a client for the given key and model
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Auth` for an empty key and `LlmError::Other` if
    /// the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, model: &str) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Auth("no API key configured".to_string()));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            model: normalize_model_name(model),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            client,
        })
    }

    pub fn set_model(&mut self, model: &str) {
        self.model = normalize_model_name(model);
    }

    /// Lists models that support content generation
    ///
    /// Names are returned without the `models/` prefix. Also serves as an
    /// API key check during setup.
    pub fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/models", API_BASE);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| self.transport_error(e))?;
        if !(200..300).contains(&status) {
            return Err(classify_status(status, &body));
        }

        let json: Value = serde_json::from_str(&body)
            .map_err(|e| LlmError::Other(format!("Invalid model list response: {}", e)))?;

        Ok(parse_model_list(&json))
    }

    fn transport_error(&self, error: reqwest::Error) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout(self.timeout_secs)
        } else {
            LlmError::Connection(error.to_string())
        }
    }
}

impl TextGenerator for GeminiClient {
    fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: &SamplingParams,
    ) -> Result<GeneratedText, LlmError> {
        let url = format!("{}/models/{}:generateContent", API_BASE, self.model);
        let body = build_request_body(system_prompt, user_prompt, params);

        debug!("Requesting completion from {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let text = response.text().map_err(|e| self.transport_error(e))?;
        if !(200..300).contains(&status) {
            return Err(classify_status(status, &text));
        }

        let json: Value = serde_json::from_str(&text)
            .map_err(|e| LlmError::Other(format!("Invalid response body: {}", e)))?;

        extract_text(&json).map(GeneratedText::new)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Strips the `models/` prefix the API uses in resource names
pub fn normalize_model_name(model: &str) -> String {
    let trimmed = model.trim();
    let name = trimmed.strip_prefix("models/").unwrap_or(trimmed);
    if name.is_empty() {
        DEFAULT_MODEL.to_string()
    } else {
        name.to_string()
    }
}

/// Builds the `generateContent` request payload
pub fn build_request_body(system_prompt: &str, user_prompt: &str, params: &SamplingParams) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": system_prompt }] },
        "contents": [{ "role": "user", "parts": [{ "text": user_prompt }] }],
        "generationConfig": {
            "temperature": params.temperature,
            "topP": params.top_p,
            "topK": params.top_k,
            "maxOutputTokens": params.max_output_tokens,
        },
    })
}

/// Maps a non-success HTTP response onto an error kind
pub fn classify_status(status: u16, body: &str) -> LlmError {
    let message = error_message(body);
    let lower = message.to_lowercase();

    match status {
        401 | 403 => LlmError::Auth(message),
        429 => LlmError::Quota(message),
        400 if lower.contains("api key") || lower.contains("api_key") => LlmError::Auth(message),
        400 | 413 if lower.contains("token") || lower.contains("too long") || lower.contains("exceeds") => {
            LlmError::InputTooLong(message)
        }
        408 => LlmError::Timeout(0),
        500..=599 => LlmError::Unavailable(format!("HTTP {}: {}", status, message)),
        _ => LlmError::Other(format!("HTTP {}: {}", status, message)),
    }
}

/// Pulls `error.message` out of an API error body, or returns the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Extracts the generated text from a `generateContent` response
///
/// Prompt-level and candidate-level safety blocks become `ContentPolicy`.
pub fn extract_text(response: &Value) -> Result<String, LlmError> {
    if let Some(reason) = response
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(Value::as_str)
    {
        return Err(LlmError::ContentPolicy(reason.to_string()));
    }

    let Some(candidate) = response.get("candidates").and_then(|c| c.get(0)) else {
        return Ok(String::new());
    };

    if let Some(finish) = candidate.get("finishReason").and_then(Value::as_str) {
        if matches!(finish, "SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" | "SPII") {
            return Err(LlmError::ContentPolicy(finish.to_string()));
        }
    }

    let text = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    Ok(text)
}

/// Extracts generation-capable Gemini model names from a `models` response
pub fn parse_model_list(response: &Value) -> Vec<String> {
    response
        .get("models")
        .and_then(Value::as_array)
        .map(|models| {
            models
                .iter()
                .filter(|m| {
                    m.get("supportedGenerationMethods")
                        .and_then(Value::as_array)
                        .map(|methods| methods.iter().any(|x| x.as_str() == Some("generateContent")))
                        .unwrap_or(true)
                })
                .filter_map(|m| m.get("name").and_then(Value::as_str))
                .filter(|name| name.contains("gemini"))
                .map(normalize_model_name)
                .collect()
        })
        .unwrap_or_default()
}
