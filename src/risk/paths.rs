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

//! Sensitive-path and redirection analysis
//!
//! Extracts absolute paths referenced by a command (a regex heuristic, not
//! a shell parser) and reports those under a fixed list of system
//! locations, plus output redirections that target them.

use regex::Regex;
use std::fmt;

/// System locations whose modification or disclosure warrants a warning
///
/// Entries are matched on path-component boundaries, most specific first.
/// A trailing `*` makes the entry a raw prefix (`/dev/sd*` covers `/dev/sda1`).
pub const SENSITIVE_PATHS: &[&str] = &[
    "/etc/passwd",
    "/etc/shadow",
    "/etc/sudoers",
    "/etc/ssh",
    "/etc/fstab",
    "/etc/hosts",
    "/etc/hostname",
    "/etc/resolv.conf",
    "/etc",
    "/boot",
    "/usr/bin",
    "/usr/lib",
    "/usr/lib64",
    "/bin",
    "/sbin",
    "/lib",
    "/lib64",
    "/var/log",
    "/proc",
    "/sys",
    "/dev/sd*",
    "/dev/nvme*",
];

/// One sensitive location referenced by a command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathFinding {
    /// Path as written in the command, quotes stripped
    pub path: String,
    /// Entry of [`SENSITIVE_PATHS`] it falls under
    pub sensitive_root: &'static str,
    /// Whether the path is the target of an output redirection
    pub redirected: bool,
}

impl fmt::Display for PathFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.redirected {
            write!(f, "redirects output to sensitive path: {}", self.path)
        } else {
            write!(f, "sensitive path: {}", self.path)
        }
    }
}

/// Regex-based path extractor
#[derive(Debug)]
pub struct PathAnalyzer {
    path_token: Regex,
    redirection: Regex,
}

impl Default for PathAnalyzer {
    fn default() -> Self {
        Self {
            path_token: Regex::new(r#"(?:^|[\s=])['"]?(/[^\s;|><&'"()]+)"#)
                .expect("path token pattern should be valid regex"),
            redirection: Regex::new(r#"(?:&>>?|[0-9]?>>?)\s*['"]?(/[^\s;|><&'"()]+)"#)
                .expect("redirection pattern should be valid regex"),
        }
    }
}

impl PathAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute paths appearing as arguments, in order of appearance
    pub fn extract_paths(&self, command: &str) -> Vec<String> {
        self.path_token
            .captures_iter(command)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Absolute paths that output redirections (`>`, `>>`, `2>`, `&>`) write to
    pub fn redirection_targets(&self, command: &str) -> Vec<String> {
        self.redirection
            .captures_iter(command)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Reports every sensitive location the command touches
    ///
    /// Redirection findings come first; a path is reported once.
    ///
    /// # Example
    /// ```
    /// use smart_shell::risk::paths::PathAnalyzer;
    ///
    /// let analyzer = PathAnalyzer::new();
    /// let findings = analyzer.analyze("echo 1 > /proc/sys/vm/drop_caches");
    /// assert_eq!(findings.len(), 1);
    /// assert!(findings[0].redirected);
    /// ```
    pub fn analyze(&self, command: &str) -> Vec<PathFinding> {
        let mut findings: Vec<PathFinding> = Vec::new();

        let redirected = self.redirection_targets(command);
        let arguments = self.extract_paths(command);
        let candidates = redirected
            .iter()
            .map(|p| (p, true))
            .chain(arguments.iter().map(|p| (p, false)));

        for (path, is_redirect) in candidates {
            if findings.iter().any(|f| &f.path == path) {
                continue;
            }
            if let Some(root) = sensitive_root(path) {
                findings.push(PathFinding {
                    path: path.clone(),
                    sensitive_root: root,
                    redirected: is_redirect,
                });
            }
        }

        findings
    }
}

/// Returns the sensitive-path entry covering `path`, if any
pub fn sensitive_root(path: &str) -> Option<&'static str> {
    let normalized = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };

    SENSITIVE_PATHS.iter().copied().find(|entry| match entry.strip_suffix('*') {
        Some(prefix) => normalized.starts_with(prefix),
        None => {
            normalized == *entry
                || normalized
                    .strip_prefix(entry)
                    .is_some_and(|rest| rest.starts_with('/'))
        }
    })
}
