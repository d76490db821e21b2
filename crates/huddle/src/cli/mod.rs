//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the huddle binary.

mod commands;
mod recap;

pub use commands::{Cli, Commands, WeekArgs};
pub use recap::{run_audit, run_recap, show_truth};
