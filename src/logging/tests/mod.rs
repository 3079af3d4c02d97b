//! Logging setup tests
