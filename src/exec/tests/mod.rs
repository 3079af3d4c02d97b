//! Execution engine tests
//!
//! - Failure signature interpretation
//! - Credential fallback order and reset
//! - Real subprocess execution under `sh`


#[cfg(test)]
mod diagnose_tests;

#[cfg(test)]
mod executor_tests;
