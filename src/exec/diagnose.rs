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

//! Failure interpretation for finished commands
//!
//! Maps a non-zero exit plus captured stderr onto a [`FailureKind`],
//! extracts the binary name from "command not found" messages of the
//! common shells, and suggests a package that provides it.

use regex::Regex;

use super::FailureKind;

/// Exit status shells use for an unknown command
const EXIT_COMMAND_NOT_FOUND: i32 = 127;

/// Stderr signature analyser
#[derive(Debug)]
pub struct FailureInterpreter {
    not_found_patterns: Vec<Regex>,
}

impl Default for FailureInterpreter {
    fn default() -> Self {
        Self {
            not_found_patterns: vec![
                // zsh: command not found: foo
                Regex::new(r"command not found:\s*(\S+)")
                    .expect("zsh not-found pattern should be valid regex"),
                // bash: foo: command not found
                Regex::new(r"([^\s:]+):\s*command not found")
                    .expect("bash not-found pattern should be valid regex"),
                // fish: Unknown command: foo
                Regex::new(r"(?i)unknown command:?\s*'?([^\s']+)'?")
                    .expect("fish not-found pattern should be valid regex"),
                // dash: sh: 1: foo: not found
                Regex::new(r"\d+:\s*([^\s:]+):\s*not found")
                    .expect("dash not-found pattern should be valid regex"),
            ],
        }
    }
}

impl FailureInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies a failed command from its stderr and exit code
    ///
    /// `exit_code` is `None` when the process was killed by a signal.
    pub fn diagnose(&self, stderr: &str, exit_code: Option<i32>) -> FailureKind {
        let lower = stderr.to_lowercase();

        if lower.contains("incorrect password attempt") {
            return FailureKind::IncorrectCredential;
        }
        if lower.contains("no such file or directory") {
            return FailureKind::MissingPath;
        }
        if lower.contains("permission denied") {
            return FailureKind::PermissionDenied;
        }

        let missing = self.missing_command(stderr);
        if missing.is_some()
            || lower.contains("command not found")
            || exit_code == Some(EXIT_COMMAND_NOT_FOUND)
        {
            return FailureKind::CommandNotFound { command: missing };
        }

        match exit_code {
            Some(code) => FailureKind::ExitCode(code),
            None => FailureKind::Signal,
        }
    }

    /// Extracts the unknown binary from a "command not found" message
    pub fn missing_command(&self, stderr: &str) -> Option<String> {
        self.not_found_patterns
            .iter()
            .find_map(|pattern| pattern.captures(stderr))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// Package that most likely provides `command` (Debian naming)
///
/// Unknown commands map to a package of the same name.
pub fn suggest_package(command: &str) -> String {
    let package = match command {
        "pip" | "pip3" => "python3-pip",
        "python" | "python3" => "python3",
        "node" => "nodejs",
        "docker" => "docker.io",
        "java" => "default-jre",
        "javac" => "default-jdk",
        "mvn" => "maven",
        "ssh" | "scp" => "openssh-client",
        "nc" => "netcat-openbsd",
        "convert" => "imagemagick",
        "gcc" | "make" | "g++" => "build-essential",
        "ifconfig" | "netstat" | "route" => "net-tools",
        "dig" | "nslookup" => "dnsutils",
        "rg" => "ripgrep",
        "fd" => "fd-find",
        "nvim" => "neovim",
        "7z" => "p7zip-full",
        other => other,
    };
    package.to_string()
}

/// Stderr lines produced by sudo's own password handling
///
/// These are hidden from the user so nothing credential-related is echoed.
pub fn is_sudo_chatter(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("[sudo] password for")
        || lower.contains("sudo: password")
        || lower.contains("sorry, try again")
}
