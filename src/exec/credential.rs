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

//! Sudo credential resolution
//!
//! A password is looked up in three places, in order: the persisted
//! configuration, the in-memory session cache, and finally an interactive
//! prompt whose answer is cached for the rest of the session. Nothing is
//! written back to disk from here.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use tracing::{debug, info};

use super::ExecutionFault;

/// Interactive source of a sudo password
pub trait PasswordPrompt {
    /// Asks the user for their password without echoing it
    fn prompt_password(&mut self, message: &str) -> io::Result<String>;
}

/// Where a resolved password came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    Config,
    Session,
    Prompt,
}

/// Three-level sudo password cache
pub struct CredentialCache {
    configured: Option<String>,
    session: Option<String>,
    prompt: Box<dyn PasswordPrompt>,
}

impl CredentialCache {
    /// Creates a cache seeded with the persisted password, if any
    pub fn new(configured: Option<String>, prompt: Box<dyn PasswordPrompt>) -> Self {
        Self {
            configured: configured.filter(|p| !p.is_empty()),
            session: None,
            prompt,
        }
    }

    /// Resolves a password: config, then session, then prompt
    ///
    /// # Errors
    ///
    /// Returns `ExecutionFault::Credential` if the prompt fails or the user
    /// enters nothing.
    pub fn resolve(&mut self) -> Result<(String, CredentialSource), ExecutionFault> {
        if let Some(password) = &self.configured {
            return Ok((password.clone(), CredentialSource::Config));
        }
        if let Some(password) = &self.session {
            return Ok((password.clone(), CredentialSource::Session));
        }

        let password = self
            .prompt
            .prompt_password("[sudo] password")
            .map_err(|e| ExecutionFault::Credential(e.to_string()))?;

        if password.is_empty() {
            return Err(ExecutionFault::Credential("no password entered".to_string()));
        }

        debug!("Caching sudo password for this session");
        self.session = Some(password.clone());
        Ok((password, CredentialSource::Prompt))
    }

    /// Drops every known password after sudo rejected one
    ///
    /// The persisted password is ignored for the rest of the session so
    /// the next elevated command prompts again.
    pub fn invalidate(&mut self) {
        if self.configured.is_some() {
            info!("Stored sudo password was rejected; ignoring it for this session");
        }
        self.configured = None;
        self.session = None;
    }

    /// Forgets the session password (the persisted one is kept)
    pub fn forget_session(&mut self) {
        self.session = None;
    }

    pub fn has_session_password(&self) -> bool {
        self.session.is_some()
    }
}

/// Whether sudo would ask for a password right now
///
/// Uses `sudo -n true`, which fails instead of prompting when a password
/// is required (no cached timestamp, no NOPASSWD rule).
pub fn sudo_requires_password() -> bool {
    Command::new("sudo")
        .args(["-n", "true"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| !status.success())
        .unwrap_or(true)
}

/// Checks a sudo password by refreshing the sudo timestamp with it
///
/// The cached timestamp is dropped first (`sudo -k`) so a stale ticket
/// cannot make a wrong password look valid.
pub fn validate_sudo_password(password: &str) -> Result<bool, ExecutionFault> {
    let _ = Command::new("sudo")
        .arg("-k")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    let mut child = Command::new("sudo")
        .args(["-S", "-p", "", "-v"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ExecutionFault::ShellNotFound("sudo".to_string()),
            _ => ExecutionFault::Spawn(e),
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        writeln!(stdin, "{}", password)?;
    }

    Ok(child.wait()?.success())
}
