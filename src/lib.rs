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

//! smart-shell
//!
//! Translates plain-language requests into shell command plans with a
//! language model, classifies every command by risk before anything runs,
//! and executes approved plans under the user's shell.
//!
//! # Features
//!
//! - **Risk Classification:** Deterministic, tiered pattern analysis (safe, info-leak, medium, high, blocked)
//! - **Plan Generation:** JSON command plans with bounded retry around the model call
//! - **Guarded Execution:** Confirmation policy, sudo credential fallback, failure diagnosis
//! - **History:** Every plan recorded with its outcome, written atomically
//!
//! # Architecture
//!
//! - **`core`:** Shared types (risk levels, verdicts, plans, host context) and `/etc/os-release` parsing
//! - **`risk`:** Ordered pattern tables and sensitive-path analysis
//! - **`llm`:** Text-generation capability and the Gemini backend
//! - **`plan`:** Prompt construction, response parsing, retry
//! - **`exec`:** Subprocess execution, credentials, failure interpretation
//! - **`history`:** Persistent request log
//! - **`orchestrator`:** The generate → classify → confirm → execute → record pipeline
//! - **`config`:** User settings and atomic file storage
//! - **`logging`:** `tracing` subscriber setup
//! - **`ui`:** Terminal rendering and prompts
//!
//! # Examples
//!
//! ## Classifying a command
//!
//! ```
//! use smart_shell::core::RiskLevel;
//! use smart_shell::risk::RiskClassifier;
//!
//! let classifier = RiskClassifier::new();
//!
//! assert_eq!(classifier.classify("rm -rf /").status, RiskLevel::Blocked);
//! assert_eq!(classifier.classify("sudo apt install htop").status, RiskLevel::Medium);
//! assert_eq!(classifier.classify("ls -la").status, RiskLevel::Safe);
//! ```
//!
//! ## Running the pipeline
//!
//! ```no_run
//! use smart_shell::core::OsContext;
//! use smart_shell::exec::{credential::CredentialCache, ShellExecutor};
//! use smart_shell::history::HistoryStore;
//! use smart_shell::llm::gemini::GeminiClient;
//! use smart_shell::orchestrator::Orchestrator;
//! use smart_shell::plan::PlanGenerator;
//! use smart_shell::ui::{TerminalInteraction, TerminalPasswordPrompt, TerminalSink};
//!
//! let os = OsContext::default();
//! let client = GeminiClient::new("api-key", "gemini-2.5-flash")?;
//! let credentials = CredentialCache::new(None, Box::new(TerminalPasswordPrompt));
//! let executor = ShellExecutor::new(os.shell, credentials, Box::new(TerminalSink));
//!
//! let mut orchestrator =
//!     Orchestrator::new(PlanGenerator::new(client), executor, HistoryStore::in_memory());
//! let mut ui = TerminalInteraction::new(os.package_manager);
//!
//! let outcome = orchestrator.process("show disk usage", &os, &mut ui);
//! println!("{:?}", outcome);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod core;
pub mod exec;
pub mod history;
pub mod interrupt;
pub mod llm;
pub mod logging;
pub mod orchestrator;
pub mod plan;
pub mod risk;
pub mod ui;

// Re-export commonly used types for convenience
pub use crate::core::{CommandPlan, OsContext, RiskLevel, RiskVerdict};
pub use orchestrator::{Orchestrator, PipelineOutcome};
pub use risk::RiskClassifier;
