//! The `devplan list` command.

use serde::Serialize;

use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::profile::{Category, Profile};
use crate::registry::Registry;
use crate::ui::{format_minutes, format_size_mb, Output};

use super::dispatcher::{Command, CommandResult};
use super::display::profiles_table;

/// One row of `list`/`search` JSON output.
#[derive(Debug, Serialize)]
pub struct ProfileSummary<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub category: Category,
    pub description: &'a str,
    pub components: usize,
    pub total_size_mb: u64,
    pub total_install_minutes: u32,
}

impl<'a> From<&'a Profile> for ProfileSummary<'a> {
    fn from(profile: &'a Profile) -> Self {
        Self {
            id: &profile.id,
            name: &profile.name,
            category: profile.category,
            description: &profile.description,
            components: profile.components.len(),
            total_size_mb: profile.total_size_mb(),
            total_install_minutes: profile.total_install_minutes(),
        }
    }
}

/// Print `profiles` as a table (or JSON).
pub(super) fn print_profiles(output: &Output, profiles: &[&Profile]) -> Result<()> {
    if output.is_json() {
        let summaries: Vec<ProfileSummary<'_>> = profiles.iter().map(|p| (*p).into()).collect();
        output.json(&summaries)?;
        return Ok(());
    }

    output.line(&profiles_table(profiles).render());
    if output.mode().shows_detail() {
        for profile in profiles {
            output.detail(&format!(
                "  {} {}",
                output.theme().id.apply_to(&profile.id),
                output.theme().dim.apply_to(format!(
                    "{} (~{})",
                    profile.description,
                    format_minutes(profile.total_install_minutes())
                ))
            ));
        }
    }
    Ok(())
}

pub struct ListCommand {
    registry: Registry,
    args: ListArgs,
}

impl ListCommand {
    pub fn new(registry: Registry, args: ListArgs) -> Self {
        Self { registry, args }
    }
}

impl Command for ListCommand {
    fn execute(&self, output: &Output) -> Result<CommandResult> {
        let profiles = match self.args.category {
            Some(category) => self.registry.list_category(category),
            None => self.registry.list(),
        };

        if !output.is_json() {
            let total: u64 = profiles.iter().map(|p| p.total_size_mb()).sum();
            let heading = match self.args.category {
                Some(category) => format!("{} profiles", category.label()),
                None => "Profiles".to_string(),
            };
            output.status(&output.theme().format_header(&format!(
                "{} ({}, {} total)",
                heading,
                profiles.len(),
                format_size_mb(total)
            )));
        }

        print_profiles(output, &profiles)?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{DevplanTheme, OutputMode};

    #[test]
    fn lists_builtin_profiles() {
        let registry = Registry::load_all().unwrap();
        let cmd = ListCommand::new(registry, ListArgs::default());
        let output = Output::new(OutputMode::Quiet, false, DevplanTheme::plain());
        assert!(cmd.execute(&output).unwrap().success);
    }

    #[test]
    fn summary_counts_components() {
        let registry = Registry::load_all().unwrap();
        let profile = registry.get("web-nextjs").unwrap();
        let summary = ProfileSummary::from(profile);
        assert_eq!(summary.components, profile.components.len());
        assert_eq!(summary.total_size_mb, profile.total_size_mb());
    }
}
