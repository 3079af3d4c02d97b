//! Pipeline tests driven by scripted doubles
//!
//! - Confirmation policy and dry runs
//! - Blocked-command edit cycle
//! - Stop-at-first-failure execution
//! - Generation outcomes

#[cfg(test)]
mod doubles;
