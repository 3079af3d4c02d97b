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

//! Text generation capability.
//!
//! The plan generator only needs `generate(system, user, params) -> text`.
//! This module defines that seam as the [`TextGenerator`] trait, the single
//! normalised response type, and the error kinds the retry policy keys on.
//! [`gemini::GeminiClient`] is the production backend; [`FakeGenerator`]
//! replays scripted responses for tests.

pub mod gemini;

use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;

/// Errors surfaced by a generation backend
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LlmError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Rate limit or quota exceeded: {0}")]
    Quota(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Blocked by content policy: {0}")]
    ContentPolicy(String),

    #[error("Input too long: {0}")]
    InputTooLong(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Model request failed: {0}")]
    Other(String),
}

impl LlmError {
    /// Transient failures worth another attempt
    ///
    /// Authentication, content-policy and input-size failures repeat
    /// identically on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::Connection(_) | LlmError::Timeout(_) | LlmError::Quota(_) | LlmError::Unavailable(_)
        )
    }
}

/// Sampling parameters passed through to the backend
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl SamplingParams {
    /// Near-deterministic settings for command planning
    pub fn planning() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 1000,
        }
    }

    /// Slightly looser settings for prose explanations
    pub fn explanation() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 500,
        }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::planning()
    }
}

/// Normalised backend response
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratedText {
    pub text: String,
}

impl GeneratedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A text-generation capability
pub trait TextGenerator {
    /// Generates a completion for the given system and user prompts
    fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: &SamplingParams,
    ) -> Result<GeneratedText, LlmError>;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}

impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: &SamplingParams,
    ) -> Result<GeneratedText, LlmError> {
        (**self).generate(system_prompt, user_prompt, params)
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

const EXPLAIN_SYSTEM_PROMPT: &str = "You are a Linux command expert. Explain what the given \
shell command does, step by step, in a few short sentences. Mention any risk it carries. \
Reply in plain text without markdown.";

/// Asks the model for a plain-text explanation of a command
pub fn explain_command<G: TextGenerator + ?Sized>(
    generator: &G,
    command: &str,
) -> Result<String, LlmError> {
    let user_prompt = format!("Explain this shell command: {}", command);
    let response = generator.generate(EXPLAIN_SYSTEM_PROMPT, &user_prompt, &SamplingParams::explanation())?;
    Ok(response.text.trim().to_string())
}

/// Scripted generator for tests
///
/// Responses are replayed in order; once a single response remains it is
/// returned for every further call.
pub struct FakeGenerator {
    responses: Mutex<VecDeque<Result<GeneratedText, LlmError>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn new(responses: Vec<Result<GeneratedText, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with the same text
    pub fn always_text(text: &str) -> Self {
        Self::new(vec![Ok(GeneratedText::new(text))])
    }

    /// Always fails with the same error
    pub fn always_error(error: LlmError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Number of generate calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    /// User prompts received, in call order
    pub fn user_prompts(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl TextGenerator for FakeGenerator {
    fn generate(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
        _params: &SamplingParams,
    ) -> Result<GeneratedText, LlmError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(user_prompt.to_string());
        }

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| LlmError::Other("fake generator poisoned".to_string()))?;

        match responses.len() {
            0 => Ok(GeneratedText::default()),
            1 => responses[0].clone(),
            _ => responses
                .pop_front()
                .unwrap_or_else(|| Ok(GeneratedText::default())),
        }
    }

    fn model(&self) -> &str {
        "fake"
    }
}

#[cfg(test)]
mod tests;
