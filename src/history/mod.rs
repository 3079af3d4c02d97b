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

//! Append-only record of prompts, plans and outcomes.
//!
//! The store is a single JSON array in `~/.local/share/smart-shell/history.json`,
//! rewritten in full (atomically) on every [`HistoryStore::save`]. Entries are
//! created with `executed = false` and updated at most once.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{storage, ConfigError};
use crate::core::CommandPlan;

pub const HISTORY_FILE: &str = "history.json";

/// Entries shown by `history` / `!history` when no limit is given
pub const DEFAULT_DISPLAY_LIMIT: usize = 10;

const ID_FORMAT: &str = "%Y%m%d%H%M%S%3f";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("No history entry with id {0}")]
    NotFound(String),

    #[error("History entry {0} already has an execution result")]
    AlreadyRecorded(String),

    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to persist history: {0}")]
    Persist(#[from] ConfigError),
}

/// Commands of an entry: older files store a single string
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandRecord {
    Single(String),
    Plan(Vec<String>),
}

impl CommandRecord {
    pub fn commands(&self) -> Vec<String> {
        match self {
            CommandRecord::Single(command) => vec![command.clone()],
            CommandRecord::Plan(commands) => commands.clone(),
        }
    }
}

impl From<&CommandPlan> for CommandRecord {
    fn from(plan: &CommandPlan) -> Self {
        CommandRecord::Plan(plan.commands.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    /// RFC 3339 local time
    pub timestamp: String,
    pub prompt: String,
    pub command: CommandRecord,
    #[serde(default)]
    pub executed: bool,
    /// `None` until the plan has run
    #[serde(default)]
    pub success: Option<bool>,
}

impl HistoryEntry {
    pub fn plan(&self) -> CommandPlan {
        CommandPlan::new(self.command.commands())
    }
}

/// In-memory history with optional file backing
#[derive(Debug, Default)]
pub struct HistoryStore {
    path: Option<PathBuf>,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Opens the history file, degrading to an empty store
    ///
    /// A corrupt file is moved to a timestamped backup; read failures are
    /// logged and the store starts empty. Never fails.
    pub fn open(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => match serde_json::from_str::<Vec<HistoryEntry>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("History file {} is corrupt: {}", path.display(), e);
                    if let Err(e) = storage::quarantine(&path) {
                        warn!("{}", e);
                    }
                    Vec::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!("Could not read history {}: {}", path.display(), e);
                Vec::new()
            }
        };

        debug!("Loaded {} history entries", entries.len());
        Self {
            path: Some(path),
            entries,
        }
    }

    /// Store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Appends a not-yet-executed entry and returns its id
    pub fn record(&mut self, prompt: &str, plan: &CommandPlan) -> String {
        let now = Local::now();
        let id = self.next_id(now.format(ID_FORMAT).to_string());

        self.entries.push(HistoryEntry {
            id: id.clone(),
            timestamp: now.to_rfc3339(),
            prompt: prompt.to_string(),
            command: CommandRecord::from(plan),
            executed: false,
            success: None,
        });

        debug!("Recorded history entry {}", id);
        id
    }

    /// Sets the execution result of entry `id`
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `AlreadyRecorded` if the entry already
    /// carries a result.
    pub fn mark_executed(&mut self, id: &str, success: bool) -> Result<(), HistoryError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;

        if entry.executed {
            return Err(HistoryError::AlreadyRecorded(id.to_string()));
        }

        entry.executed = true;
        entry.success = Some(success);
        Ok(())
    }

    /// Rewrites the whole file atomically (no-op for in-memory stores)
    pub fn save(&self) -> Result<(), HistoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.entries)?;
        storage::write_atomically(path, json.as_bytes(), None)?;
        Ok(())
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Up to `n` entries, newest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev().take(n)
    }

    #[cfg(test)]
    pub(crate) fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timestamp id, bumped past the newest existing id if the clock has
    /// not advanced
    fn next_id(&self, candidate: String) -> String {
        let newest = self
            .entries
            .iter()
            .filter_map(|e| e.id.parse::<u64>().ok())
            .max();

        match (candidate.parse::<u64>(), newest) {
            (Ok(value), Some(newest)) if value <= newest => (newest + 1).to_string(),
            _ => candidate,
        }
    }
}

#[cfg(test)]
mod tests;
