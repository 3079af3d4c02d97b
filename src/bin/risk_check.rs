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

//! Offline risk check: prints the verdict for each command argument
//!
//! ```text
//! risk-check "rm -rf /" "ls -la" "sudo apt install htop"
//! ```
//!
//! Exits 1 if any command is blocked.

use clap::Parser;
use colored::*;
use smart_shell::core::RiskLevel;
use smart_shell::risk::RiskClassifier;
use smart_shell::ui::render::risk_badge;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "risk-check")]
#[command(author, version, about = "Classify shell commands by risk", long_about = None)]
struct Args {
    /// Commands to classify (quote each one)
    #[arg(required = true)]
    commands: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let classifier = RiskClassifier::new();
    let mut blocked = false;

    for command in &args.commands {
        let verdict = classifier.classify(command);
        blocked |= verdict.status == RiskLevel::Blocked;

        println!("{} {}", risk_badge(verdict.status), command.bold());
        if verdict.status != RiskLevel::Safe {
            println!("  {} {}", "→".dimmed(), verdict.reason);
        }
        for note in &verdict.notes {
            println!("    {}", note.dimmed());
        }
        if let Some(pattern) = &verdict.matched_pattern {
            println!("    {} {}", "pattern:".dimmed(), pattern);
        }
    }

    if blocked {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
