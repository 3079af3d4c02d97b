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

//! Prompt-to-execution pipeline.
//!
//! ```text
//! Idle → Generating → Classifying → AwaitingConfirmation → Executing → Recording → Idle
//!                          │
//!                          └→ Blocked (one edit-and-reclassify cycle) → Idle
//! ```
//!
//! Everything user-facing goes through [`Interaction`], so the pipeline is
//! driven by scripted doubles in tests and by the terminal UI in the binary.
//!
//! - A blocked command offers one edit; a still-blocked edit ends the run
//! - The plan is recorded in history once settled, before confirmation
//! - One confirmation per plan, at the highest risk present
//! - Commands run in order and stop at the first failure
//! - Dry runs record the plan and never execute
//! - Ctrl-C while generating abandons the request and returns to `Idle`

use std::fmt;
use tracing::{debug, info, warn};

use crate::core::{CommandPlan, OsContext, RiskLevel, RiskVerdict};
use crate::exec::{CommandRunner, ExecutionFault, ExecutionOutcome};
use crate::history::HistoryStore;
use crate::llm::TextGenerator;
use crate::plan::{GenerationError, PlanGenerator, PlanResult};
use crate::risk::{highest_risk, RiskClassifier};

/// User-facing side of the pipeline
pub trait Interaction {
    /// Shows the classified plan before any decision is asked
    fn show_plan(&mut self, plan: &CommandPlan, verdicts: &[RiskVerdict]);

    /// Offers to replace a blocked command; `None` keeps it (and ends the run)
    fn edit_blocked(&mut self, command: &str, verdict: &RiskVerdict) -> Option<String>;

    /// Asks once for the whole plan; `flagged` lists the commands at
    /// Medium or above with their verdicts
    fn confirm(&mut self, level: RiskLevel, flagged: &[(&str, &RiskVerdict)]) -> bool;

    fn command_started(&mut self, index: usize, total: usize, command: &str);

    fn command_finished(&mut self, command: &str, outcome: &ExecutionOutcome);

    fn command_fault(&mut self, command: &str, fault: &ExecutionFault);
}

/// Pipeline switches set from the command line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Record the plan, never execute
    pub dry_run: bool,
    /// Skip the Medium/High confirmation
    pub auto_confirm: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PipelineState {
    #[default]
    Idle,
    Generating,
    Classifying,
    Blocked,
    AwaitingConfirmation,
    Executing,
    Recording,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Generating => "generating",
            PipelineState::Classifying => "classifying",
            PipelineState::Blocked => "blocked",
            PipelineState::AwaitingConfirmation => "awaiting confirmation",
            PipelineState::Executing => "executing",
            PipelineState::Recording => "recording",
        };
        write!(f, "{}", name)
    }
}

/// How one prompt ended
#[derive(Clone, Debug, PartialEq)]
pub enum PipelineOutcome {
    /// The model produced no commands
    EmptyPlan,
    /// The model refused the request
    Declined { reason: String },
    GenerationFailed(GenerationError),
    /// Ctrl-C during generation; nothing was recorded
    Interrupted,
    /// A command stayed blocked; nothing ran
    Blocked { command: String, verdict: RiskVerdict },
    /// The user declined the confirmation
    Cancelled { history_id: String },
    DryRun { history_id: String },
    Executed { history_id: String, success: bool },
}

/// Sequences generation, classification, confirmation, execution and
/// history recording for one prompt at a time
pub struct Orchestrator<G, R> {
    generator: PlanGenerator<G>,
    classifier: RiskClassifier,
    runner: R,
    history: HistoryStore,
    options: PipelineOptions,
    state: PipelineState,
}

impl<G: TextGenerator, R: CommandRunner> Orchestrator<G, R> {
    pub fn new(generator: PlanGenerator<G>, runner: R, history: HistoryStore) -> Self {
        Self {
            generator,
            classifier: RiskClassifier::new(),
            runner,
            history,
            options: PipelineOptions::default(),
            state: PipelineState::Idle,
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    pub fn options_mut(&mut self) -> &mut PipelineOptions {
        &mut self.options
    }

    pub fn generator(&self) -> &PlanGenerator<G> {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut PlanGenerator<G> {
        &mut self.generator
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    /// Runs the full pipeline for a natural-language request
    pub fn process(
        &mut self,
        prompt: &str,
        os: &OsContext,
        ui: &mut dyn Interaction,
    ) -> PipelineOutcome {
        self.transition(PipelineState::Generating);

        let plan = match self.generator.generate_plan(prompt, os) {
            PlanResult::Ready(plan) => plan,
            PlanResult::Declined { reason } => {
                self.transition(PipelineState::Idle);
                return PipelineOutcome::Declined { reason };
            }
            PlanResult::Failed(error) => {
                self.transition(PipelineState::Idle);
                return PipelineOutcome::GenerationFailed(error);
            }
            PlanResult::Interrupted => {
                self.transition(PipelineState::Idle);
                return PipelineOutcome::Interrupted;
            }
        };

        if plan.is_empty() {
            info!("No commands generated for prompt");
            self.transition(PipelineState::Idle);
            return PipelineOutcome::EmptyPlan;
        }

        self.run_plan(prompt, plan, ui)
    }

    /// Classifies, confirms, executes and records an existing plan
    ///
    /// Shared by [`process`](Self::process) and re-running a history entry.
    pub fn run_plan(
        &mut self,
        prompt: &str,
        plan: CommandPlan,
        ui: &mut dyn Interaction,
    ) -> PipelineOutcome {
        if plan.is_empty() {
            self.transition(PipelineState::Idle);
            return PipelineOutcome::EmptyPlan;
        }

        self.transition(PipelineState::Classifying);
        let (plan, verdicts) = match self.settle_plan(plan, ui) {
            Ok(settled) => settled,
            Err((plan, command, verdict)) => {
                self.record(prompt, &plan);
                self.transition(PipelineState::Idle);
                return PipelineOutcome::Blocked { command, verdict };
            }
        };

        let history_id = self.record(prompt, &plan);

        if self.options.dry_run {
            self.transition(PipelineState::Recording);
            info!("Dry run: recorded {} without executing", history_id);
            self.transition(PipelineState::Idle);
            return PipelineOutcome::DryRun { history_id };
        }

        let level = highest_risk(&verdicts);
        if level.needs_confirmation() && !self.options.auto_confirm {
            self.transition(PipelineState::AwaitingConfirmation);

            let flagged: Vec<(&str, &RiskVerdict)> = plan
                .iter()
                .zip(&verdicts)
                .filter(|(_, v)| v.status.needs_confirmation())
                .map(|(c, v)| (c, v))
                .collect();

            if !ui.confirm(level, &flagged) {
                info!("User declined {} plan", level);
                self.transition(PipelineState::Idle);
                return PipelineOutcome::Cancelled { history_id };
            }
        } else if level.needs_confirmation() {
            debug!("Auto-confirming {} plan", level);
        }

        self.transition(PipelineState::Executing);
        let success = self.execute(&plan, ui);

        self.transition(PipelineState::Recording);
        if let Err(e) = self.history.mark_executed(&history_id, success) {
            warn!("Could not update history entry: {}", e);
        }
        self.persist_history();

        self.transition(PipelineState::Idle);
        PipelineOutcome::Executed {
            history_id,
            success,
        }
    }

    /// Applies the blocked-command edit cycle
    ///
    /// Returns the final plan and its verdicts, or the plan with the
    /// command that is still blocked.
    #[allow(clippy::type_complexity)]
    fn settle_plan(
        &mut self,
        mut plan: CommandPlan,
        ui: &mut dyn Interaction,
    ) -> Result<(CommandPlan, Vec<RiskVerdict>), (CommandPlan, String, RiskVerdict)> {
        let verdicts = self.classifier.classify_plan(&plan);
        ui.show_plan(&plan, &verdicts);

        let Some(index) = first_blocked(&verdicts) else {
            return Ok((plan, verdicts));
        };

        self.transition(PipelineState::Blocked);
        let blocked_command = plan.commands[index].clone();
        warn!("Blocked command in plan: {}", blocked_command);

        let edited = ui
            .edit_blocked(&blocked_command, &verdicts[index])
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let Some(edited) = edited else {
            let verdict = verdicts[index].clone();
            return Err((plan, blocked_command, verdict));
        };

        plan.commands[index] = edited;
        self.transition(PipelineState::Classifying);
        let verdicts = self.classifier.classify_plan(&plan);
        ui.show_plan(&plan, &verdicts);

        match first_blocked(&verdicts) {
            Some(still) => {
                warn!("Edited plan is still blocked: {}", plan.commands[still]);
                let command = plan.commands[still].clone();
                let verdict = verdicts[still].clone();
                Err((plan, command, verdict))
            }
            None => Ok((plan, verdicts)),
        }
    }

    /// Runs commands in order, stopping at the first failure
    fn execute(&mut self, plan: &CommandPlan, ui: &mut dyn Interaction) -> bool {
        let total = plan.len();

        for (index, command) in plan.iter().enumerate() {
            ui.command_started(index, total, command);

            match self.runner.run(command) {
                Ok(outcome) => {
                    ui.command_finished(command, &outcome);
                    if !outcome.success {
                        info!("Stopping plan after failed command {}/{}", index + 1, total);
                        return false;
                    }
                }
                Err(fault) => {
                    warn!("Execution fault on '{}': {}", command, fault);
                    ui.command_fault(command, &fault);
                    return false;
                }
            }
        }

        true
    }

    fn record(&mut self, prompt: &str, plan: &CommandPlan) -> String {
        let id = self.history.record(prompt, plan);
        self.persist_history();
        id
    }

    fn persist_history(&self) {
        if let Err(e) = self.history.save() {
            warn!("History not saved: {}", e);
        }
    }

    fn transition(&mut self, next: PipelineState) {
        debug!("Pipeline state: {} -> {}", self.state, next);
        self.state = next;
    }
}

fn first_blocked(verdicts: &[RiskVerdict]) -> Option<usize> {
    verdicts.iter().position(|v| v.status == RiskLevel::Blocked)
}

#[cfg(test)]
mod tests;
