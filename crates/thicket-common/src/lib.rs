//! Common utilities for the Thicket selector engine.
//!
//! This crate provides shared infrastructure used by all Thicket components:
//! - **Warning System** - colored terminal output for recoverable problems
//!   such as failing custom pseudo-selector hooks

pub mod warning;
