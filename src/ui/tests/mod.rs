//! Terminal UI tests
//!
//! - Input routing for the interactive loop
//! - Rendering of plans, hints and history
