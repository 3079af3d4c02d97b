//! Generation capability tests
//!
//! - Gemini response and error mapping (no network)
//! - Scripted generator behaviour and explain helper

#[cfg(test)]
mod gemini_tests;
