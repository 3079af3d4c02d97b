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

//! Whole-file persistence helpers shared by config and history.
//!
//! Every write goes through a temporary file that is renamed over the
//! target, so a crash mid-write leaves either the old or the new content.
//! Unreadable files are moved aside rather than overwritten.

use atomic_write_file::AtomicWriteFile;
use chrono::Local;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::config::ConfigError;

/// Atomically replaces `path` with `content`, creating parent directories
///
/// When `mode` is given (Unix only) it is applied to the temporary file
/// before any content is written, so the target never appears with looser
/// permissions.
///
/// # Errors
///
/// Returns `ConfigError::WriteFailed` if the temporary file cannot be
/// created, written or renamed. The original file is untouched in that case.
pub fn write_atomically(path: &Path, content: &[u8], mode: Option<u32>) -> Result<(), ConfigError> {
    let parent = path
        .parent()
        .ok_or_else(|| ConfigError::InvalidPath(path.to_path_buf()))?;
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let mut file = AtomicWriteFile::options()
        .open(path)
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to open for atomic write: {}", e)))?;

    if let Some(mode) = mode {
        restrict_permissions(file.as_file(), mode)?;
    }

    file.write_all(content)
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to write content: {}", e)))?;

    file.commit()
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to commit atomic write: {}", e)))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(file: &fs::File, mode: u32) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(mode))
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to restrict permissions: {}", e)))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &fs::File, _mode: u32) -> Result<(), ConfigError> {
    Ok(())
}

/// Moves an unreadable file aside to `<name>.corrupt-<timestamp>`
///
/// Returns the backup path so the caller can report it.
pub fn quarantine(path: &Path) -> Result<PathBuf, ConfigError> {
    let timestamp = Local::now().format("%Y-%m-%d_%H%M%S");

    let original_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ConfigError::InvalidPath(path.to_path_buf()))?;

    let backup_path = path.with_file_name(format!("{}.corrupt-{}", original_name, timestamp));

    fs::rename(path, &backup_path).map_err(|e| {
        ConfigError::BackupFailed(format!("{} -> {}: {}", path.display(), backup_path.display(), e))
    })?;

    warn!(
        "Moved unreadable file {} to {}",
        path.display(),
        backup_path.display()
    );
    Ok(backup_path)
}
