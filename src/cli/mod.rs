//! Command-line interface for devplan.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, CompletionsArgs, ListArgs, PlanArgs, SearchArgs, ShowArgs, SystemArgs,
};
pub use commands::{exit, exit_code_for, Command, CommandDispatcher, CommandResult};
