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

//! src/core/types.rs
//!
//! Shared domain types: risk levels and verdicts, command plans,
//! and the host context (distribution, package manager, shell) that
//! plan generation and execution are parameterised by.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk tier assigned to a single shell command
///
/// Totally ordered from least to most dangerous, so the riskiest
/// command of a plan is simply the maximum of its verdicts.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Nothing matched
    Safe,
    /// May print secrets or environment to the terminal
    InfoLeak,
    /// Changes system state; needs confirmation
    Medium,
    /// Destructive or irreversible; needs explicit confirmation
    High,
    /// Refused outright, never executed as written
    Blocked,
}

impl RiskLevel {
    /// Whether this tier requires the user to confirm before execution
    pub fn needs_confirmation(self) -> bool {
        matches!(self, RiskLevel::Medium | RiskLevel::High)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Safe => write!(f, "safe"),
            RiskLevel::InfoLeak => write!(f, "info_leak"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Blocked => write!(f, "blocked"),
        }
    }
}

/// Classification result for one command
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RiskVerdict {
    /// Assigned tier
    pub status: RiskLevel,
    /// Human-readable explanation of the tier
    pub reason: String,
    /// Extra findings, e.g. sensitive paths touched by the command
    pub notes: Vec<String>,
    /// Label of the rule that fired (if any)
    pub matched_pattern: Option<String>,
}

impl RiskVerdict {
    pub fn safe() -> Self {
        Self {
            status: RiskLevel::Safe,
            reason: "No risky patterns detected".to_string(),
            notes: Vec::new(),
            matched_pattern: None,
        }
    }

    pub fn new(status: RiskLevel, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            notes: Vec::new(),
            matched_pattern: None,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.matched_pattern = Some(pattern.into());
        self
    }

    pub fn with_notes(mut self, notes: Vec<String>) -> Self {
        self.notes = notes;
        self
    }
}

/// Ordered list of shell commands produced for one prompt
///
/// Commands are kept verbatim: no normalisation, no trimming.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CommandPlan {
    pub commands: Vec<String>,
}

impl CommandPlan {
    pub fn new(commands: Vec<String>) -> Self {
        Self { commands }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for CommandPlan {
    fn from(commands: Vec<String>) -> Self {
        Self::new(commands)
    }
}

/// Interactive shell the commands are written for and executed by
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ShellFlavor {
    #[default]
    Bash,
    Zsh,
    Fish,
    /// Plain POSIX `sh`
    Posix,
}

impl ShellFlavor {
    /// Maps the basename of a `$SHELL` value to a flavor
    ///
    /// Unknown shells fall back to bash, which is what the planner
    /// writes commands for by default.
    pub fn from_shell_path(shell: &str) -> Self {
        let name = shell.rsplit('/').next().unwrap_or(shell);
        match name {
            "zsh" => ShellFlavor::Zsh,
            "fish" => ShellFlavor::Fish,
            "sh" | "dash" | "ash" => ShellFlavor::Posix,
            _ => ShellFlavor::Bash,
        }
    }

    /// Interpreter invoked with `-c <command>`
    pub fn program(self) -> &'static str {
        match self {
            ShellFlavor::Bash => "bash",
            ShellFlavor::Zsh => "zsh",
            ShellFlavor::Fish => "fish",
            ShellFlavor::Posix => "sh",
        }
    }
}

impl fmt::Display for ShellFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program())
    }
}

/// System package manager, inferred from the distribution id
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PackageManager {
    Apt,
    Dnf,
    Pacman,
    Zypper,
    Apk,
    Emerge,
    Brew,
    Unknown,
}

impl PackageManager {
    /// Chooses a package manager from an `/etc/os-release` `ID` (and `ID_LIKE`)
    pub fn for_distribution(id: &str, id_like: &str) -> Self {
        let matches_any = |names: &[&str]| {
            names.contains(&id) || id_like.split_whitespace().any(|like| names.contains(&like))
        };

        if matches_any(&["ubuntu", "debian", "linuxmint", "pop", "elementary", "kali", "raspbian"]) {
            PackageManager::Apt
        } else if matches_any(&["fedora", "rhel", "centos", "rocky", "almalinux"]) {
            PackageManager::Dnf
        } else if matches_any(&["arch", "manjaro", "endeavouros", "garuda"]) {
            PackageManager::Pacman
        } else if matches_any(&["opensuse", "suse", "opensuse-leap", "opensuse-tumbleweed"]) {
            PackageManager::Zypper
        } else if matches_any(&["alpine"]) {
            PackageManager::Apk
        } else if matches_any(&["gentoo"]) {
            PackageManager::Emerge
        } else if matches_any(&["macos", "darwin"]) {
            PackageManager::Brew
        } else {
            PackageManager::Unknown
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PackageManager::Apt => "apt",
            PackageManager::Dnf => "dnf",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
            PackageManager::Apk => "apk",
            PackageManager::Emerge => "emerge",
            PackageManager::Brew => "brew",
            PackageManager::Unknown => "unknown",
        }
    }

    /// Command that installs `package`, if the manager is known
    pub fn install_command(self, package: &str) -> Option<String> {
        let command = match self {
            PackageManager::Apt => format!("sudo apt install {}", package),
            PackageManager::Dnf => format!("sudo dnf install {}", package),
            PackageManager::Pacman => format!("sudo pacman -S {}", package),
            PackageManager::Zypper => format!("sudo zypper install {}", package),
            PackageManager::Apk => format!("sudo apk add {}", package),
            PackageManager::Emerge => format!("sudo emerge {}", package),
            PackageManager::Brew => format!("brew install {}", package),
            PackageManager::Unknown => return None,
        };
        Some(command)
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Host description embedded in the planning prompt
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OsContext {
    /// Distribution id, e.g. `ubuntu`
    pub id: String,
    /// Human-readable name, e.g. `Ubuntu 24.04 LTS`
    pub name: String,
    pub package_manager: PackageManager,
    pub shell: ShellFlavor,
}

impl Default for OsContext {
    fn default() -> Self {
        Self {
            id: "linux".to_string(),
            name: "Linux".to_string(),
            package_manager: PackageManager::Unknown,
            shell: ShellFlavor::Bash,
        }
    }
}
