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

//! Terminal user interface
//!
//! # Module Structure
//!
//! ```text
//! ui/
//! ├── mod.rs       // This file - exports
//! ├── commands.rs  // Interactive input routing (!commands, exit words)
//! ├── render.rs    // Plan, verdict and history formatting
//! └── terminal.rs  // dialoguer-backed Interaction, password prompt, output sink
//! ```

pub mod commands;
pub mod render;
pub mod terminal;

pub use commands::{classify_input, BangCommand, InputKind};
pub use terminal::{LineReader, TerminalInteraction, TerminalPasswordPrompt, TerminalSink};

#[cfg(test)]
mod tests;
