//! Plan generation tests
//!
//! - Response extraction and shape validation
//! - Retry policy (bounded attempts, terminal errors)
//! - Prompt construction


#[cfg(test)]
mod prompt_tests;

#[cfg(test)]
mod response_tests;
