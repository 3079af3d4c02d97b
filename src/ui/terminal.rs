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

//! Terminal implementations of the pipeline's user-facing traits.

use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, BasicHistory, Confirm, Input, Password, Select};
use std::io;
use tracing::{debug, warn};

use super::render;
use crate::core::{CommandPlan, PackageManager, RiskLevel, RiskVerdict};
use crate::exec::{credential::PasswordPrompt, ExecutionFault, ExecutionOutcome, OutputLine, OutputSink};
use crate::orchestrator::Interaction;

/// Prompts, confirmations and progress on stdout
pub struct TerminalInteraction {
    package_manager: PackageManager,
}

impl TerminalInteraction {
    pub fn new(package_manager: PackageManager) -> Self {
        Self { package_manager }
    }
}

impl Interaction for TerminalInteraction {
    fn show_plan(&mut self, plan: &CommandPlan, verdicts: &[RiskVerdict]) {
        println!("\n{}", render::format_plan(plan, verdicts));
    }

    fn edit_blocked(&mut self, command: &str, verdict: &RiskVerdict) -> Option<String> {
        println!(
            "{} {} {}",
            "✗".red().bold(),
            "Blocked:".red().bold(),
            verdict.reason
        );

        let wants_edit = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Edit this command?")
            .default(false)
            .interact()
            .unwrap_or(false);
        if !wants_edit {
            return None;
        }

        match Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Command")
            .with_initial_text(command)
            .allow_empty(true)
            .interact_text()
        {
            Ok(edited) => Some(edited),
            Err(e) => {
                debug!("Edit prompt failed: {}", e);
                None
            }
        }
    }

    fn confirm(&mut self, level: RiskLevel, flagged: &[(&str, &RiskVerdict)]) -> bool {
        println!("{} {}", render::risk_badge(level), "Review before running:".bold());
        for (command, verdict) in flagged {
            println!("  {} {} ({})", "•".yellow(), command, verdict.reason);
        }

        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(render::confirmation_prompt(level))
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    fn command_started(&mut self, index: usize, total: usize, command: &str) {
        println!(
            "{} {} {}",
            "→".cyan(),
            format!("[{}/{}]", index + 1, total).dimmed(),
            command.bold()
        );
    }

    fn command_finished(&mut self, _command: &str, outcome: &ExecutionOutcome) {
        match &outcome.failure {
            None => println!("{} Done", "✓".green()),
            Some(failure) => {
                println!("{} {}", "✗".red().bold(), failure);
                if let Some(hint) = render::failure_hint(failure, self.package_manager) {
                    println!("  {}", hint.yellow());
                }
            }
        }
    }

    fn command_fault(&mut self, command: &str, fault: &ExecutionFault) {
        println!("{} Could not run '{}': {}", "✗".red().bold(), command, fault);
    }
}

/// Hidden sudo password prompt
#[derive(Default)]
pub struct TerminalPasswordPrompt;

impl PasswordPrompt for TerminalPasswordPrompt {
    fn prompt_password(&mut self, message: &str) -> io::Result<String> {
        Password::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

/// Prints command output as it streams in
#[derive(Default)]
pub struct TerminalSink;

impl OutputSink for TerminalSink {
    fn line(&mut self, line: &OutputLine) {
        match line {
            OutputLine::Stdout(text) => println!("{}", text),
            OutputLine::Stderr(text) => eprintln!("{}", text.red()),
        }
    }
}

/// Interactive prompt line with in-session history (arrow keys)
pub struct LineReader {
    history: BasicHistory,
}

impl Default for LineReader {
    fn default() -> Self {
        Self {
            history: BasicHistory::new().max_entries(100).no_duplicates(true),
        }
    }
}

impl LineReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads one line; errors mean the terminal went away (EOF, ^D)
    pub fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .allow_empty(true)
            .history_with(&mut self.history)
            .interact_text()
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

/// Yes/no question with a default
pub fn ask_confirm(prompt: &str, default: bool) -> bool {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact()
        .unwrap_or(default)
}

/// Hidden input (API key, password)
pub fn ask_secret(prompt: &str) -> io::Result<String> {
    TerminalPasswordPrompt.prompt_password(prompt)
}

/// Picks one of `items`, preselecting `current` when present
pub fn select_from(prompt: &str, items: &[String], current: Option<&str>) -> Option<usize> {
    let default = current
        .and_then(|c| items.iter().position(|i| i == c))
        .unwrap_or(0);

    match Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(items)
        .default(default)
        .interact_opt()
    {
        Ok(choice) => choice,
        Err(e) => {
            warn!("Selection prompt failed: {}", e);
            None
        }
    }
}
