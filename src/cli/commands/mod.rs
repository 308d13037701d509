//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by
//! [`CommandDispatcher`]. Commands that need profiles or machine facts get a
//! loaded [`Registry`](crate::registry::Registry) or a
//! [`SystemProfiler`](crate::system::SystemProfiler) at construction, so
//! tests can hand them fakes.

pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod list;
pub mod plan;
pub mod schema;
pub mod search;
pub mod show;
pub mod system;

pub use dispatcher::{exit, exit_code_for, Command, CommandDispatcher, CommandResult};
