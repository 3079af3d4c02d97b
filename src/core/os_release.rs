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

//! src/core/os_release.rs
//!
//! Host detection: `/etc/os-release` parsing and login shell lookup
//!
//! The os-release format is a list of `KEY=value` assignments where the
//! value may be double-quoted, single-quoted or bare. Comments start with
//! `#`. Parsing uses nom combinators; detection never fails outright and
//! degrades to a generic Linux context when the file is missing.

use nom::{
    branch::alt,
    bytes::complete::{take_till, take_while1},
    character::complete::char,
    combinator::rest,
    sequence::delimited,
    IResult, Parser,
};
use std::{collections::HashMap, path::Path};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::types::{OsContext, PackageManager, ShellFlavor};

/// Default location of the os-release file
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// os-release parse errors with line number context
#[derive(Debug, Error)]
pub enum OsReleaseError {
    #[error("Invalid os-release line {line}: {content}")]
    InvalidLine { line: usize, content: String },

    #[error("IO error reading os-release: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses a complete os-release document into a key/value map
///
/// # Example
/// ```
/// use smart_shell::core::os_release::parse_os_release;
///
/// let fields = parse_os_release("ID=ubuntu\nPRETTY_NAME=\"Ubuntu 24.04 LTS\"\n").unwrap();
/// assert_eq!(fields["ID"], "ubuntu");
/// assert_eq!(fields["PRETTY_NAME"], "Ubuntu 24.04 LTS");
/// ```
pub fn parse_os_release(content: &str) -> Result<HashMap<String, String>, OsReleaseError> {
    let mut fields = HashMap::new();

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match parse_assignment(trimmed) {
            Ok((_, (key, value))) => {
                fields.insert(key.to_string(), value.to_string());
            }
            Err(_) => {
                return Err(OsReleaseError::InvalidLine {
                    line: line_num + 1,
                    content: trimmed.to_string(),
                });
            }
        }
    }

    Ok(fields)
}

/// Parses one `KEY=value` assignment
pub fn parse_assignment(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, key) = parse_key(input)?;
    let (input, _) = char('=').parse(input)?;
    let (input, value) = alt((parse_quoted, rest)).parse(input)?;

    Ok((input, (key, value.trim())))
}

fn parse_key(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_').parse(input)
}

fn parse_quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_till(|c: char| c == '"'), char('"')),
        delimited(char('\''), take_till(|c: char| c == '\''), char('\'')),
    ))
    .parse(input)
}

/// Builds an [`OsContext`] from parsed os-release fields
pub fn context_from_fields(fields: &HashMap<String, String>, shell: ShellFlavor) -> OsContext {
    let id = fields
        .get("ID")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "linux".to_string());
    let id_like = fields.get("ID_LIKE").map(String::as_str).unwrap_or("");
    let name = fields
        .get("PRETTY_NAME")
        .or_else(|| fields.get("NAME"))
        .cloned()
        .unwrap_or_else(|| "Linux".to_string());

    OsContext {
        package_manager: PackageManager::for_distribution(&id, id_like),
        id,
        name,
        shell,
    }
}

/// Reads the login shell from `$SHELL`
pub fn detect_shell() -> ShellFlavor {
    match std::env::var("SHELL") {
        Ok(shell) if !shell.is_empty() => ShellFlavor::from_shell_path(&shell),
        _ => ShellFlavor::default(),
    }
}

/// Detects the host context from the given os-release file and `$SHELL`
///
/// Missing or unparsable files yield a generic Linux context.
pub fn detect_os_context(path: &Path) -> OsContext {
    let shell = detect_shell();

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("os-release unavailable at {}: {}", path.display(), e);
            return OsContext { shell, ..OsContext::default() };
        }
    };

    match parse_os_release(&content) {
        Ok(fields) => context_from_fields(&fields, shell),
        Err(e) => {
            warn!("Ignoring malformed os-release: {}", e);
            OsContext { shell, ..OsContext::default() }
        }
    }
}
