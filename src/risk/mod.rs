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

//! Rule-based command risk classification.
//!
//! Every command proposed for execution passes through [`RiskClassifier`]
//! before the user sees it. Classification is pure (no I/O, no shell
//! parsing) and deterministic: the same text always yields the same verdict.
//!
//! # Tier Order
//!
//! Tiers are evaluated in fixed priority order and the first tier that
//! matches wins, so a command matching several tables always receives its
//! most dangerous classification:
//!
//! 1. **Malformed**: empty, whitespace-only, or no recognisable characters → `Blocked`
//! 2. **Blocklist**: catastrophic commands (`rm -rf /`, fork bombs, disk wipes) → `Blocked`
//! 3. **High-risk table**: irreversible operations → `High`
//! 4. **Privilege elevation**: `sudo`, `su`, `doas`, `pkexec` → `Medium`
//! 5. **Medium-risk table**: state-changing operations → `Medium`
//! 6. **Sensitive paths / redirections**: system locations touched → `Medium`
//! 7. **Information-leak table**: environment, history, secrets → `InfoLeak`
//! 8. Otherwise → `Safe`
//!
//! Within a table the first matching rule determines the explanation.
//! Any `Medium` verdict additionally lists the sensitive paths the
//! command references in its notes.

pub mod paths;
pub mod patterns;

use crate::core::{CommandPlan, RiskLevel, RiskVerdict};
use paths::PathAnalyzer;
use patterns::RiskRule;

/// Ordered rule tables for command classification
pub struct RiskClassifier {
    blocklist: Vec<RiskRule>,
    high_risk: Vec<RiskRule>,
    privilege: Vec<RiskRule>,
    medium_risk: Vec<RiskRule>,
    info_leak: Vec<RiskRule>,
    paths: PathAnalyzer,
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self {
            blocklist:   patterns::build_blocklist(),
            high_risk:   patterns::build_high_risk_rules(),
            privilege:   patterns::build_privilege_rules(),
            medium_risk: patterns::build_medium_risk_rules(),
            info_leak:   patterns::build_info_leak_rules(),
            paths:       PathAnalyzer::new(),
        }
    }
}

impl RiskClassifier {
    /// Creates a new classifier with all tables loaded
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies a single command
    ///
    /// # Examples
    /// ```
    /// use smart_shell::core::RiskLevel;
    /// use smart_shell::risk::RiskClassifier;
    ///
    /// let classifier = RiskClassifier::new();
    ///
    /// assert_eq!(classifier.classify("rm -rf /").status, RiskLevel::Blocked);
    /// assert_eq!(classifier.classify("sudo apt install htop").status, RiskLevel::Medium);
    /// assert_eq!(classifier.classify("ls -la").status, RiskLevel::Safe);
    /// ```
    pub fn classify(&self, command: &str) -> RiskVerdict {
        // Tier 1: malformed input never reaches the tables
        if command.trim().is_empty() || !patterns::has_command_characters(command) {
            return RiskVerdict::new(RiskLevel::Blocked, "malformed")
                .with_notes(vec!["Command is empty or has no recognisable characters".to_string()]);
        }

        // Tier 2: blocklist
        if let Some(rule) = first_match(&self.blocklist, command) {
            return RiskVerdict::new(
                RiskLevel::Blocked,
                format!("Blocked command: {}", rule.label),
            )
            .with_pattern(rule.label)
            .with_notes(vec![rule.explanation.to_string()]);
        }

        // Tier 3: high-risk table
        if let Some(rule) = first_match(&self.high_risk, command) {
            return RiskVerdict::new(
                RiskLevel::High,
                format!("High-risk operation: {}", rule.label),
            )
            .with_pattern(rule.label)
            .with_notes(vec![rule.explanation.to_string()]);
        }

        let findings = self.paths.analyze(command);
        let path_notes = || findings.iter().map(|f| f.to_string());

        // Tier 4: privilege elevation is medium regardless of payload
        if let Some(rule) = first_match(&self.privilege, command) {
            return RiskVerdict::new(
                RiskLevel::Medium,
                format!("Runs with elevated privileges ({})", rule.label),
            )
            .with_pattern(rule.label)
            .with_notes(std::iter::once(rule.explanation.to_string()).chain(path_notes()).collect());
        }

        // Tier 5: medium-risk table
        if let Some(rule) = first_match(&self.medium_risk, command) {
            return RiskVerdict::new(
                RiskLevel::Medium,
                format!("Changes system state: {}", rule.label),
            )
            .with_pattern(rule.label)
            .with_notes(std::iter::once(rule.explanation.to_string()).chain(path_notes()).collect());
        }

        // Tier 6: sensitive paths and redirections
        if let Some(first) = findings.first() {
            let reason = if findings.iter().any(|f| f.redirected) {
                "Redirects output into a sensitive system path"
            } else {
                "References a sensitive system path"
            };
            return RiskVerdict::new(RiskLevel::Medium, reason)
                .with_pattern(first.sensitive_root)
                .with_notes(path_notes().collect());
        }

        // Tier 7: information leaks
        if let Some(rule) = first_match(&self.info_leak, command) {
            return RiskVerdict::new(
                RiskLevel::InfoLeak,
                format!("May expose sensitive information: {}", rule.label),
            )
            .with_pattern(rule.label)
            .with_notes(vec![rule.explanation.to_string()]);
        }

        RiskVerdict::safe()
    }

    /// Classifies every command of a plan independently, preserving order
    pub fn classify_plan(&self, plan: &CommandPlan) -> Vec<RiskVerdict> {
        plan.iter().map(|command| self.classify(command)).collect()
    }
}

/// Highest tier among a set of verdicts (`Safe` for none)
pub fn highest_risk(verdicts: &[RiskVerdict]) -> RiskLevel {
    verdicts
        .iter()
        .map(|v| v.status)
        .max()
        .unwrap_or(RiskLevel::Safe)
}

fn first_match<'a>(rules: &'a [RiskRule], command: &str) -> Option<&'a RiskRule> {
    rules.iter().find(|rule| rule.is_match(command))
}

#[cfg(test)]
mod tests;
