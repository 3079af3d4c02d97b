use std::collections::{HashSet, VecDeque};

use crate::core::{CommandPlan, RiskLevel, RiskVerdict};
use crate::exec::{CommandRunner, ExecutionFault, ExecutionOutcome, FailureKind};
use crate::orchestrator::Interaction;

/// Interaction double with queued answers and a log of what was asked
#[derive(Default)]
pub struct ScriptedInteraction {
    pub edits: VecDeque<Option<String>>,
    pub confirmations: VecDeque<bool>,
    pub shown_plans: Vec<Vec<String>>,
    pub edit_requests: Vec<String>,
    pub confirm_requests: Vec<(RiskLevel, Vec<String>)>,
    pub started: Vec<String>,
    pub faults: Vec<String>,
}

impl ScriptedInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edit(mut self, edit: Option<&str>) -> Self {
        self.edits.push_back(edit.map(str::to_string));
        self
    }

    pub fn with_confirmation(mut self, answer: bool) -> Self {
        self.confirmations.push_back(answer);
        self
    }
}

impl Interaction for ScriptedInteraction {
    fn show_plan(&mut self, plan: &CommandPlan, _verdicts: &[RiskVerdict]) {
        self.shown_plans.push(plan.commands.clone());
    }

    fn edit_blocked(&mut self, command: &str, _verdict: &RiskVerdict) -> Option<String> {
        self.edit_requests.push(command.to_string());
        self.edits.pop_front().flatten()
    }

    fn confirm(&mut self, level: RiskLevel, flagged: &[(&str, &RiskVerdict)]) -> bool {
        self.confirm_requests
            .push((level, flagged.iter().map(|(c, _)| c.to_string()).collect()));
        self.confirmations.pop_front().unwrap_or(false)
    }

    fn command_started(&mut self, _index: usize, _total: usize, command: &str) {
        self.started.push(command.to_string());
    }

    fn command_finished(&mut self, _command: &str, _outcome: &ExecutionOutcome) {}

    fn command_fault(&mut self, command: &str, _fault: &ExecutionFault) {
        self.faults.push(command.to_string());
    }
}

/// Runner double: succeeds unless the command is listed as failing/faulting
#[derive(Default)]
pub struct RecordingRunner {
    pub failing: HashSet<String>,
    pub faulting: HashSet<String>,
    pub ran: Vec<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, command: &str) -> Self {
        self.failing.insert(command.to_string());
        self
    }

    pub fn faulting_on(mut self, command: &str) -> Self {
        self.faulting.insert(command.to_string());
        self
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, command: &str) -> Result<ExecutionOutcome, ExecutionFault> {
        self.ran.push(command.to_string());

        if self.faulting.contains(command) {
            return Err(ExecutionFault::ShellNotFound("bash".to_string()));
        }
        if self.failing.contains(command) {
            return Ok(ExecutionOutcome::failed(Some(1), FailureKind::ExitCode(1)));
        }
        Ok(ExecutionOutcome::succeeded())
    }
}
