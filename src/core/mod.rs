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

//! src/core/mod.rs
//!
//! Core domain module
//!
//! This module contains the data structures shared by every stage of the
//! pipeline, plus host detection:
//! - Risk levels, verdicts and command plans
//! - Shell flavor and package manager inference
//! - `/etc/os-release` parsing
//!
//! Nothing here performs network access or runs commands, so it is
//! fully unit-testable.

pub mod os_release;
pub mod types;

pub use os_release::{detect_os_context, OsReleaseError};
pub use types::*;

#[cfg(test)]
mod tests;
