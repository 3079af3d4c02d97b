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

//! Command execution engine.
//!
//! [`ShellExecutor`] runs one command at a time under the user's shell
//! (`<shell> -c <command>`), streams stdout and stderr lines to an
//! [`OutputSink`] as they arrive, and turns a non-zero exit into a
//! [`FailureKind`]. Ordinary command failure is an `Ok` outcome; only
//! engine faults (missing shell, spawn failure, unavailable credential)
//! are errors.
//!
//! # Privilege elevation
//!
//! A leading `sudo` is rewritten to `sudo -S -p ''` and the password is
//! written to the child's stdin, so it never appears in the command line,
//! the process list, or the terminal. When sudo does not need a password
//! (cached timestamp, NOPASSWD) the command runs unchanged.

pub mod credential;
pub mod diagnose;

use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::ShellFlavor;
use credential::CredentialCache;
use diagnose::FailureInterpreter;

/// Engine-internal faults (distinct from a command failing)
#[derive(Debug, Error)]
pub enum ExecutionFault {
    #[error("Shell not found: {0}")]
    ShellNotFound(String),

    #[error("Failed to start command: {0}")]
    Spawn(io::Error),

    #[error("Sudo password unavailable: {0}")]
    Credential(String),

    #[error("IO error during execution: {0}")]
    Io(#[from] io::Error),
}

/// Why a command failed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// sudo rejected the password
    IncorrectCredential,
    MissingPath,
    PermissionDenied,
    /// Unknown binary; the name is extracted when the shell reports it
    CommandNotFound { command: Option<String> },
    /// Unrecognised non-zero exit
    ExitCode(i32),
    /// Terminated by a signal
    Signal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::IncorrectCredential => write!(f, "incorrect sudo password"),
            FailureKind::MissingPath => write!(f, "no such file or directory"),
            FailureKind::PermissionDenied => write!(f, "permission denied"),
            FailureKind::CommandNotFound { command: Some(name) } => {
                write!(f, "command not found: {}", name)
            }
            FailureKind::CommandNotFound { command: None } => write!(f, "command not found"),
            FailureKind::ExitCode(code) => write!(f, "failed with exit code {}", code),
            FailureKind::Signal => write!(f, "terminated by a signal"),
        }
    }
}

/// Result of running one command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub success: bool,
    /// `None` when terminated by a signal
    pub exit_code: Option<i32>,
    pub failure: Option<FailureKind>,
}

impl ExecutionOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            failure: None,
        }
    }

    pub fn failed(exit_code: Option<i32>, failure: FailureKind) -> Self {
        Self {
            success: false,
            exit_code,
            failure: Some(failure),
        }
    }
}

/// One line of command output
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Receives command output as it is produced
pub trait OutputSink {
    fn line(&mut self, line: &OutputLine);
}

impl OutputSink for Vec<OutputLine> {
    fn line(&mut self, line: &OutputLine) {
        self.push(line.clone());
    }
}

/// Anything that can run a single shell command
pub trait CommandRunner {
    fn run(&mut self, command: &str) -> Result<ExecutionOutcome, ExecutionFault>;
}

/// Runs commands under the user's shell
pub struct ShellExecutor {
    shell: ShellFlavor,
    credentials: CredentialCache,
    sink: Box<dyn OutputSink>,
    interpreter: FailureInterpreter,
}

impl ShellExecutor {
    pub fn new(shell: ShellFlavor, credentials: CredentialCache, sink: Box<dyn OutputSink>) -> Self {
        Self {
            shell,
            credentials,
            sink,
            interpreter: FailureInterpreter::new(),
        }
    }

    pub fn shell(&self) -> ShellFlavor {
        self.shell
    }

    pub fn credentials_mut(&mut self) -> &mut CredentialCache {
        &mut self.credentials
    }

    /// Resolves the sudo password when the command needs one
    fn prepare(&mut self, command: &str) -> Result<(String, Option<String>), ExecutionFault> {
        let Some(rest) = strip_sudo(command) else {
            return Ok((command.to_string(), None));
        };

        if !credential::sudo_requires_password() {
            debug!("sudo does not need a password right now");
            return Ok((command.to_string(), None));
        }

        let (password, source) = self.credentials.resolve()?;
        debug!("Using sudo password from {:?}", source);
        Ok((format!("sudo -S -p '' {}", rest), Some(password)))
    }

    fn spawn_and_stream(
        &mut self,
        script: &str,
        password: Option<&str>,
    ) -> Result<(Option<i32>, String), ExecutionFault> {
        let program = self.shell.program();

        let mut child = Command::new(program)
            .arg("-c")
            .arg(script)
            .stdin(if password.is_some() { Stdio::piped() } else { Stdio::inherit() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ExecutionFault::ShellNotFound(program.to_string()),
                _ => ExecutionFault::Spawn(e),
            })?;

        if let (Some(password), Some(mut stdin)) = (password, child.stdin.take()) {
            // Closing stdin right after the password gives the command EOF
            if let Err(e) = writeln!(stdin, "{}", password) {
                debug!("Could not pass sudo password to child: {}", e);
            }
        }

        let (tx, rx) = mpsc::channel();
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(stdout, tx.clone(), OutputLine::Stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(stderr, tx.clone(), OutputLine::Stderr));
        }
        drop(tx);

        let mut stderr_text = String::new();
        for line in rx {
            if let OutputLine::Stderr(text) = &line {
                stderr_text.push_str(text);
                stderr_text.push('\n');
                if diagnose::is_sudo_chatter(text) {
                    continue;
                }
            }
            self.sink.line(&line);
        }

        for reader in readers {
            if reader.join().is_err() {
                warn!("Output reader thread panicked");
            }
        }

        let status = child.wait()?;
        Ok((status.code(), stderr_text))
    }
}

impl CommandRunner for ShellExecutor {
    fn run(&mut self, command: &str) -> Result<ExecutionOutcome, ExecutionFault> {
        info!("Executing command under {}: {}", self.shell, command);

        let (script, password) = self.prepare(command)?;
        let (exit_code, stderr) = self.spawn_and_stream(&script, password.as_deref())?;

        if exit_code == Some(0) {
            debug!("Command succeeded");
            return Ok(ExecutionOutcome::succeeded());
        }

        let failure = self.interpreter.diagnose(&stderr, exit_code);
        if failure == FailureKind::IncorrectCredential {
            self.credentials.invalidate();
        }

        warn!("Command failed ({}): {}", failure, command);
        Ok(ExecutionOutcome::failed(exit_code, failure))
    }
}

/// Returns the command after a leading `sudo`, if it starts with one
pub fn strip_sudo(command: &str) -> Option<&str> {
    let trimmed = command.trim_start();
    let rest = trimmed.strip_prefix("sudo")?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.starts_with(char::is_whitespace).then(|| rest.trim_start())
}

fn spawn_reader<R, F>(source: R, tx: mpsc::Sender<OutputLine>, wrap: F) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
    F: Fn(String) -> OutputLine + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&buf);
                    let line = text.trim_end_matches(&['\n', '\r'][..]).to_string();
                    if tx.send(wrap(line)).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests;
