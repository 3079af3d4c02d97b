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

//! Diagnostic logging setup.
//!
//! Library code logs through `tracing`; the binaries install a `fmt`
//! subscriber that appends plain text to `error.log` in the data directory
//! so the terminal stays clean for command output. `SMART_SHELL_LOG`
//! accepts any `EnvFilter` directive.

use std::{
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "SMART_SHELL_LOG";
pub const LOG_FILE: &str = "error.log";

/// Lines shown by `!errors`
pub const ERROR_TAIL_LINES: usize = 10;

const DEFAULT_DIRECTIVE: &str = "smart_shell=info";
const VERBOSE_DIRECTIVE: &str = "smart_shell=debug";
const FALLBACK_DIRECTIVE: &str = "warn";

/// Filter directive: the environment value wins, then `--verbose`
pub fn filter_directive(env_value: Option<&str>, verbose: bool) -> String {
    match env_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => value.to_string(),
        None if verbose => VERBOSE_DIRECTIVE.to_string(),
        None => DEFAULT_DIRECTIVE.to_string(),
    }
}

/// Installs the global subscriber
///
/// Returns the log file path, or `None` when the file could not be opened
/// and logging fell back to stderr at `warn`.
pub fn init_logging(data_dir: &Path, verbose: bool) -> Option<PathBuf> {
    let env_value = std::env::var(LOG_ENV).ok();
    let directive = filter_directive(env_value.as_deref(), verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("Warning: invalid {} '{}': {}", LOG_ENV, directive, e);
        EnvFilter::new(DEFAULT_DIRECTIVE)
    });

    let log_path = data_dir.join(LOG_FILE);
    match open_log_file(&log_path) {
        Ok(file) => {
            let _ = fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .try_init();
            Some(log_path)
        }
        Err(e) => {
            let _ = fmt()
                .with_env_filter(EnvFilter::new(FALLBACK_DIRECTIVE))
                .with_writer(io::stderr)
                .with_target(false)
                .try_init();
            tracing::warn!("Could not open log file {}: {}", log_path.display(), e);
            None
        }
    }
}

fn open_log_file(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Last `n` non-empty lines of the log file
pub fn tail_log(path: &Path, n: usize) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].iter().map(|l| l.to_string()).collect())
}

#[cfg(test)]
mod tests;
