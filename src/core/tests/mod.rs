//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Type tests (RiskLevel ordering, ShellFlavor, PackageManager)
//! - os-release parsing and host context tests
