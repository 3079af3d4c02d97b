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

//! Model response parsing
//!
//! Models often wrap the JSON object in prose or code fences. The parser
//! extracts the first balanced `{...}` object (brace depth tracked outside
//! JSON string literals) and validates its shape.

use serde_json::Value;

use super::GenerationError;
use crate::core::CommandPlan;

/// Outcome of a well-formed model response
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedResponse {
    /// Commands to run (possibly empty)
    Commands(CommandPlan),
    /// The model refused and gave a reason
    Declined(String),
}

/// Returns the first balanced JSON object in `text`, if any
///
/// # Example
/// ```
/// use smart_shell::plan::response::extract_json_object;
///
/// let raw = "Sure! ```json\n{\"commands\": [\"echo }\"]}\n``` Done.";
/// assert_eq!(extract_json_object(raw), Some("{\"commands\": [\"echo }\"]}"));
/// ```
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parses raw model output into commands or a refusal
///
/// A `reason` with no commands is a refusal. A missing `commands` key is an
/// empty plan. Anything other than an array of strings is an invalid
/// structure.
pub fn parse_response(text: &str) -> Result<ParsedResponse, GenerationError> {
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let object = extract_json_object(text).ok_or_else(|| {
        GenerationError::MalformedResponse("no JSON object in model output".to_string())
    })?;

    let value: Value = serde_json::from_str(object)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    let commands = match value.get("commands") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                GenerationError::InvalidStructure("commands must contain only strings".to_string())
            })?,
        Some(_) => {
            return Err(GenerationError::InvalidStructure(
                "commands must be an array".to_string(),
            ))
        }
    };

    if commands.is_empty() {
        if let Some(reason) = value.get("reason").and_then(Value::as_str) {
            return Ok(ParsedResponse::Declined(reason.to_string()));
        }
    }

    Ok(ParsedResponse::Commands(CommandPlan::new(commands)))
}
