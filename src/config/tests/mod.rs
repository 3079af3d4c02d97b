//! Configuration tests
//!
//! - ConfigManager load/save and degradation
//! - Atomic storage helpers

#[cfg(test)]
mod config_manager_tests;

#[cfg(test)]
mod storage_tests;
