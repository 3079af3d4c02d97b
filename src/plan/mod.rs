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

//! Plan generation with bounded retry.
//!
//! [`PlanGenerator`] turns a natural-language request into a
//! [`CommandPlan`] by prompting a [`TextGenerator`] and parsing its JSON
//! reply. Transient failures (unparsable output, connection problems,
//! timeouts, quota) are retried a fixed number of times with a fixed
//! delay; failures that would repeat identically are returned at once.
//! An [`InterruptFlag`] raised during a call or a backoff abandons the
//! request with [`PlanResult::Interrupted`].
//!
//! # Example
//!
//! ```
//! use smart_shell::core::OsContext;
//! use smart_shell::llm::FakeGenerator;
//! use smart_shell::plan::{PlanGenerator, PlanResult, RetryPolicy};
//!
//! let generator = PlanGenerator::new(FakeGenerator::always_text(r#"{"commands": ["df -h"]}"#))
//!     .with_retry_policy(RetryPolicy::immediate(3));
//!
//! match generator.generate_plan("show disk usage", &OsContext::default()) {
//!     PlanResult::Ready(plan) => assert_eq!(plan.commands, vec!["df -h".to_string()]),
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

pub mod prompt;
pub mod response;

use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::{CommandPlan, OsContext};
use crate::interrupt::InterruptFlag;
use crate::llm::{LlmError, SamplingParams, TextGenerator};
use response::ParsedResponse;

/// Default number of retries after the first attempt
pub const MAX_RETRIES: u32 = 3;

/// Default delay between attempts
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Unrecoverable plan generation failures
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] LlmError),

    #[error("The model returned an empty response")]
    EmptyResponse,

    #[error("The model did not return a valid JSON object: {0}")]
    MalformedResponse(String),

    #[error("The model returned an invalid command structure: {0}")]
    InvalidStructure(String),

    #[error("Giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<GenerationError>,
    },
}

impl GenerationError {
    /// Whether another attempt could produce a different outcome
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Provider(e) => e.is_retryable(),
            GenerationError::MalformedResponse(_) => true,
            GenerationError::EmptyResponse
            | GenerationError::InvalidStructure(_)
            | GenerationError::RetriesExhausted { .. } => false,
        }
    }
}

/// Result of one `generate_plan` call
#[derive(Clone, Debug, PartialEq)]
pub enum PlanResult {
    /// A plan to classify (may be empty)
    Ready(CommandPlan),
    /// The model refused the request as unsafe
    Declined { reason: String },
    /// Generation failed terminally or retries were exhausted
    Failed(GenerationError),
    /// The user pressed Ctrl-C; any response was discarded
    Interrupted,
}

/// Retry bound and fixed backoff between attempts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            delay: RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// No delay between attempts (tests, non-interactive callers)
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            delay: Duration::ZERO,
        }
    }

    /// Total attempts including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Natural-language to command plan translator
pub struct PlanGenerator<G> {
    backend: G,
    retry: RetryPolicy,
    params: SamplingParams,
    interrupt: InterruptFlag,
}

impl<G: TextGenerator> PlanGenerator<G> {
    pub fn new(backend: G) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
            params: SamplingParams::planning(),
            interrupt: InterruptFlag::new(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Shares the session's Ctrl-C flag
    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn interrupt(&self) -> &InterruptFlag {
        &self.interrupt
    }

    pub fn backend(&self) -> &G {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut G {
        &mut self.backend
    }

    /// Generates a plan for `prompt`, retrying transient failures
    ///
    /// Makes at most `max_retries + 1` backend calls. Terminal errors
    /// (authentication, content policy, input too long, invalid structure)
    /// are returned after the first occurrence. A Ctrl-C left over from
    /// before the call is ignored.
    pub fn generate_plan(&self, prompt: &str, os: &OsContext) -> PlanResult {
        let system_prompt = prompt::build_system_prompt(os);
        let mut attempt = 0;
        self.interrupt.take();

        loop {
            attempt += 1;
            debug!(
                "Plan generation attempt {}/{} with {}",
                attempt,
                self.retry.max_attempts(),
                self.backend.model()
            );

            let result = self.attempt(&system_prompt, prompt);
            if self.interrupt.take() {
                info!("Plan generation interrupted on attempt {}", attempt);
                return PlanResult::Interrupted;
            }

            let error = match result {
                Ok(ParsedResponse::Commands(plan)) => {
                    info!("Generated plan with {} command(s)", plan.len());
                    return PlanResult::Ready(plan);
                }
                Ok(ParsedResponse::Declined(reason)) => {
                    info!("Model declined request: {}", reason);
                    return PlanResult::Declined { reason };
                }
                Err(error) => error,
            };

            if !error.is_retryable() {
                warn!("Plan generation failed: {}", error);
                return PlanResult::Failed(error);
            }

            if attempt >= self.retry.max_attempts() {
                warn!("Plan generation gave up after {} attempts: {}", attempt, error);
                return PlanResult::Failed(GenerationError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            warn!(
                "Plan generation attempt {} failed ({}), retrying in {:?}",
                attempt, error, self.retry.delay
            );
            if !self.interrupt.sleep(self.retry.delay) {
                self.interrupt.take();
                info!("Plan generation interrupted during backoff");
                return PlanResult::Interrupted;
            }
        }
    }

    fn attempt(&self, system_prompt: &str, prompt: &str) -> Result<ParsedResponse, GenerationError> {
        let response = self.backend.generate(system_prompt, prompt, &self.params)?;
        response::parse_response(&response.text)
    }
}

#[cfg(test)]
mod tests;
