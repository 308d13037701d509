//! The `devplan search` command.

use crate::cli::args::SearchArgs;
use crate::error::Result;
use crate::profile::Profile;
use crate::registry::Registry;
use crate::ui::Output;

use super::dispatcher::{Command, CommandResult};
use super::list::print_profiles;

pub struct SearchCommand {
    registry: Registry,
    args: SearchArgs,
}

impl SearchCommand {
    pub fn new(registry: Registry, args: SearchArgs) -> Self {
        Self { registry, args }
    }
}

impl Command for SearchCommand {
    fn execute(&self, output: &Output) -> Result<CommandResult> {
        let search = self.registry.search(&self.args.query);
        let matches: Vec<&Profile> = search.iter().collect();

        if matches.is_empty() && !output.is_json() {
            output.status(&format!("No profiles match '{}'.", self.args.query));
            return Ok(CommandResult::success());
        }

        print_profiles(output, &matches)?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{DevplanTheme, OutputMode};

    #[test]
    fn no_match_is_not_an_error() {
        let cmd = SearchCommand::new(
            Registry::load_all().unwrap(),
            SearchArgs {
                query: "cobol".to_string(),
            },
        );
        let output = Output::new(OutputMode::Quiet, false, DevplanTheme::plain());
        assert!(cmd.execute(&output).unwrap().success);
    }
}
