//! Command execution layer.
//!
//! Validates console commands against live storage and applies them.

pub mod console;
pub mod help;
