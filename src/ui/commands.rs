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

//! Interactive input routing.
//!
//! Lines typed at the prompt are either exit words, `!` commands handled
//! locally, misplaced CLI invocations, or requests for the model.

/// Words that leave interactive mode
pub const EXIT_WORDS: &[&str] = &["exit", "quit", "bye", "q"];

const SUBCOMMANDS: &[&str] = &["run", "setup", "history", "models", "version"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BangCommand {
    Help,
    History,
    Last,
    Redo,
    Clear,
    /// `!model` without a name opens the picker
    Model(Option<String>),
    Models,
    ForgetSudo,
    Errors,
    Explain(String),
    Unknown(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputKind {
    Empty,
    Exit,
    Bang(BangCommand),
    /// `smart-shell <subcommand>` typed inside the loop
    SubcommandHint(String),
    Prompt(String),
}

/// Routes one line of interactive input
pub fn classify_input(line: &str) -> InputKind {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return InputKind::Empty;
    }
    if EXIT_WORDS.contains(&trimmed.to_lowercase().as_str()) {
        return InputKind::Exit;
    }
    if let Some(rest) = trimmed.strip_prefix('!') {
        return InputKind::Bang(parse_bang(rest));
    }

    let mut words = trimmed.split_whitespace();
    if let (Some("smart-shell"), Some(sub)) = (words.next(), words.next()) {
        if SUBCOMMANDS.contains(&sub) {
            return InputKind::SubcommandHint(sub.to_string());
        }
    }

    InputKind::Prompt(trimmed.to_string())
}

fn parse_bang(rest: &str) -> BangCommand {
    let (name, argument) = match rest.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (rest, ""),
    };
    let argument = Some(argument.to_string()).filter(|a| !a.is_empty());

    match name.to_lowercase().as_str() {
        "help" => BangCommand::Help,
        "history" => BangCommand::History,
        "last" => BangCommand::Last,
        "redo" => BangCommand::Redo,
        "clear" => BangCommand::Clear,
        "model" => BangCommand::Model(argument),
        "models" => BangCommand::Models,
        "forget-sudo" => BangCommand::ForgetSudo,
        "errors" => BangCommand::Errors,
        "explain" => match argument {
            Some(command) => BangCommand::Explain(command),
            None => BangCommand::Unknown("explain needs a command".to_string()),
        },
        other => BangCommand::Unknown(other.to_string()),
    }
}

/// Text printed by `!help`
pub fn help_text() -> &'static str {
    "Type a request in plain language, or one of:
  !help              Show this help
  !history           Show recent requests
  !last              Show the last request and its commands
  !redo              Run the last plan again
  !clear             Clear the screen
  !model [name]      Switch model (picker when no name is given)
  !models            List available models
  !forget-sudo       Forget the sudo password for this session
  !errors            Show the last lines of the error log
  !explain <cmd>     Explain a shell command
  exit, quit, bye, q Leave"
}
