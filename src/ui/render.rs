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

//! Text rendering for plans, verdicts, outcomes and history.
//!
//! Functions here only build strings; printing is left to the caller.

use colored::{ColoredString, Colorize};

use crate::core::{CommandPlan, PackageManager, RiskLevel, RiskVerdict};
use crate::exec::{diagnose::suggest_package, FailureKind};
use crate::history::HistoryEntry;

/// Colored label for a risk tier
pub fn risk_badge(level: RiskLevel) -> ColoredString {
    let label = format!("[{}]", level.to_string().to_uppercase());
    match level {
        RiskLevel::Safe => label.green(),
        RiskLevel::InfoLeak => label.cyan(),
        RiskLevel::Medium => label.yellow(),
        RiskLevel::High => label.red().bold(),
        RiskLevel::Blocked => label.on_red().white().bold(),
    }
}

/// Numbered plan with one verdict line per flagged command
pub fn format_plan(plan: &CommandPlan, verdicts: &[RiskVerdict]) -> String {
    let mut out = format!("{}\n", "Planned commands:".bold());

    for (index, (command, verdict)) in plan.iter().zip(verdicts).enumerate() {
        out.push_str(&format!(
            "  {} {} {}\n",
            format!("{}.", index + 1).dimmed(),
            command.cyan(),
            risk_badge(verdict.status)
        ));

        if verdict.status != RiskLevel::Safe {
            out.push_str(&format!("     {} {}\n", "→".dimmed(), verdict.reason));
            for note in &verdict.notes {
                out.push_str(&format!("       {}\n", note.dimmed()));
            }
        }
    }

    out
}

/// Question asked before running a flagged plan
pub fn confirmation_prompt(level: RiskLevel) -> String {
    match level {
        RiskLevel::High => "This plan contains HIGH-RISK commands. Run it anyway?".to_string(),
        _ => "This plan changes system state. Run it?".to_string(),
    }
}

/// Follow-up hint for a failed command, if there is a useful one
pub fn failure_hint(failure: &FailureKind, package_manager: PackageManager) -> Option<String> {
    match failure {
        FailureKind::CommandNotFound {
            command: Some(binary),
        } => {
            let package = suggest_package(binary);
            Some(match package_manager.install_command(&package) {
                Some(install) => format!("'{}' is not installed. Try: {}", binary, install),
                None => format!("'{}' is not installed (package: {})", binary, package),
            })
        }
        FailureKind::IncorrectCredential => {
            Some("The sudo password was rejected; you will be asked again.".to_string())
        }
        FailureKind::PermissionDenied => {
            Some("Permission denied. The command may need sudo.".to_string())
        }
        _ => None,
    }
}

/// ✓ / ✗ / ? for an execution result
pub fn outcome_symbol(success: Option<bool>) -> ColoredString {
    match success {
        Some(true) => "✓".green(),
        Some(false) => "✗".red(),
        None => "?".yellow(),
    }
}

/// One history entry: symbol, timestamp, prompt, then its commands
pub fn format_history_entry(entry: &HistoryEntry) -> String {
    let when = entry
        .timestamp
        .get(..19)
        .unwrap_or(&entry.timestamp)
        .replace('T', " ");
    let status = if entry.executed {
        outcome_symbol(entry.success)
    } else {
        "-".dimmed()
    };

    let mut out = format!("{} {} {}\n", status, when.dimmed(), entry.prompt.bold());
    for command in entry.command.commands() {
        out.push_str(&format!("    {} {}\n", "$".dimmed(), command));
    }
    out
}
