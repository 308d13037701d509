//! Command dispatching.
//!
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::{find_project_root, load_config, DevplanConfig};
use crate::error::{DevplanError, Result};
use crate::registry::Registry;
use crate::ui::Output;

/// Process exit codes.
pub mod exit {
    pub const OK: i32 = 0;
    pub const ERROR: i32 = 1;
    pub const UNKNOWN_PROFILE: i32 = 2;
    pub const UNSATISFIED: i32 = 3;
}

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, writing through `output`.
    fn execute(&self, output: &Output) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: exit::OK,
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Exit code for an error that escaped a command.
pub fn exit_code_for(err: &DevplanError) -> i32 {
    match err {
        DevplanError::ProfileNotFound { .. } => exit::UNKNOWN_PROFILE,
        _ => exit::ERROR,
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a dispatcher for `start_dir`, optionally with an extra config file.
    pub fn new(start_dir: &Path, config_path: Option<PathBuf>) -> Self {
        Self {
            project_root: find_project_root(start_dir),
            config_path,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    fn config(&self) -> Result<DevplanConfig> {
        load_config(&self.project_root, self.config_path.as_deref())
    }

    fn registry(&self, config: &DevplanConfig) -> Result<Registry> {
        Registry::load(config)
    }

    /// Route the CLI subcommand to its implementation and run it.
    pub fn dispatch(&self, cli: &Cli, output: &Output) -> Result<CommandResult> {
        match &cli.command {
            Commands::System(args) => {
                let config = self.config()?;
                super::system::SystemCommand::new(&config, args).execute(output)
            }
            Commands::List(args) => {
                let registry = self.registry(&self.config()?)?;
                super::list::ListCommand::new(registry, args.clone()).execute(output)
            }
            Commands::Search(args) => {
                let registry = self.registry(&self.config()?)?;
                super::search::SearchCommand::new(registry, args.clone()).execute(output)
            }
            Commands::Show(args) => {
                let registry = self.registry(&self.config()?)?;
                super::show::ShowCommand::new(registry, args.clone()).execute(output)
            }
            Commands::Plan(args) => {
                let config = self.config()?;
                let registry = self.registry(&config)?;
                super::plan::PlanCommand::new(&config, registry, args.clone()).execute(output)
            }
            Commands::Schema => super::schema::SchemaCommand::new().execute(output),
            Commands::Completions(args) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(output)
            }
        }
    }
}
