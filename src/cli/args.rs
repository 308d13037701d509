//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::profile::Category;
use crate::requirements::DiskAggregation;

/// devplan - Profile this machine and plan development stack installs.
#[derive(Debug, Parser)]
#[command(name = "devplan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Extra config file, merged over ~/.devplan and .devplan configs
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show what this machine has
    System(SystemArgs),

    /// List available profiles
    List(ListArgs),

    /// Search profiles by id, name, description, category, or tag
    Search(SearchArgs),

    /// Show one profile in detail
    Show(ShowArgs),

    /// Build an installation plan for one or more profiles
    Plan(PlanArgs),

    /// Print the JSON Schema for profile documents
    Schema,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `system` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SystemArgs {
    /// Per-probe timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Skip language runtime detection
    #[arg(long)]
    pub no_runtimes: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Only profiles in this category
    #[arg(long)]
    pub category: Option<Category>,
}

/// Arguments for the `search` command.
#[derive(Debug, Clone, clap::Args)]
pub struct SearchArgs {
    /// Text to look for (case-insensitive)
    pub query: String,
}

/// Arguments for the `show` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ShowArgs {
    /// Profile id
    pub id: String,
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, clap::Args)]
pub struct PlanArgs {
    /// Profile ids, in priority order
    #[arg(required = true, value_name = "PROFILE")]
    pub profiles: Vec<String>,

    /// Exit with code 3 when the machine doesn't meet the requirements
    #[arg(long)]
    pub strict: bool,

    /// How disk requirements combine (overrides config)
    #[arg(long, value_name = "MODE")]
    pub disk_aggregation: Option<DiskAggregation>,

    /// Per-probe timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_plan_with_flags() {
        let cli = Cli::try_parse_from([
            "devplan",
            "--json",
            "plan",
            "web-nextjs",
            "ml-python",
            "--strict",
            "--disk-aggregation",
            "max",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Plan(args) => {
                assert_eq!(args.profiles, vec!["web-nextjs", "ml-python"]);
                assert!(args.strict);
                assert_eq!(args.disk_aggregation, Some(DiskAggregation::Max));
            }
            other => panic!("expected plan, got {other:?}"),
        }
    }

    #[test]
    fn plan_requires_a_profile() {
        assert!(Cli::try_parse_from(["devplan", "plan"]).is_err());
    }

    #[test]
    fn list_parses_category() {
        let cli = Cli::try_parse_from(["devplan", "list", "--category", "ml"]).unwrap();
        match cli.command {
            Commands::List(args) => assert_eq!(args.category, Some(Category::MachineLearning)),
            other => panic!("expected list, got {other:?}"),
        }
        assert!(Cli::try_parse_from(["devplan", "list", "--category", "cooking"]).is_err());
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["devplan", "system", "--quiet", "--no-color"]).unwrap();
        assert!(cli.quiet);
        assert!(cli.no_color);
    }
}
