//! Command implementations for the `epsgen` CLI.
//!
//! Each command module executes one operation and formats its output
//! according to the requested format.

pub mod completions;
pub mod config;
pub mod generate;
pub mod rewrite;
