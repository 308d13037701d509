//! The `devplan show` command.

use crate::cli::args::ShowArgs;
use crate::error::Result;
use crate::profile::{OsFamily, Profile};
use crate::registry::Registry;
use crate::requirements::format_gb;
use crate::ui::{format_minutes, format_size_mb, DevplanTheme, Output, Table};

use super::dispatcher::{Command, CommandResult};

pub struct ShowCommand {
    registry: Registry,
    args: ShowArgs,
}

impl ShowCommand {
    pub fn new(registry: Registry, args: ShowArgs) -> Self {
        Self { registry, args }
    }
}

impl Command for ShowCommand {
    fn execute(&self, output: &Output) -> Result<CommandResult> {
        let profile = self.registry.get(&self.args.id)?;

        if output.is_json() {
            output.json(profile)?;
        } else {
            for line in profile_lines(output.theme(), profile, output.mode().shows_detail()) {
                output.line(&line);
            }
        }
        Ok(CommandResult::success())
    }
}

fn requirement_summary(profile: &Profile) -> String {
    let req = &profile.requirements;
    let mut parts = vec![
        format!("{} GB RAM", format_gb(req.min_ram_gb)),
        format!("{} GB disk", format_gb(req.min_disk_gb)),
        format!("{} cores", req.min_cpu_cores),
    ];
    if req.gpu_required {
        parts.push("GPU".to_string());
    }
    if req.os_support.len() < OsFamily::ALL.len() {
        let os: Vec<&str> = req.os_support.iter().map(|os| os.as_str()).collect();
        parts.push(format!("{} only", os.join("/")));
    }
    parts.join(", ")
}

/// Full description of one profile.
pub fn profile_lines(theme: &DevplanTheme, profile: &Profile, verbose: bool) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} {}",
            theme.format_header(&profile.name),
            theme.dim.apply_to(format!("({} v{})", profile.id, profile.version))
        ),
        format!("  {}", profile.description),
        String::new(),
        format!("  {}", theme.format_field("Category", profile.category.label())),
        format!("  {}", theme.format_field("Requires", &requirement_summary(profile))),
        format!(
            "  {}",
            theme.format_field(
                "Estimate",
                &format!(
                    "{}, {}",
                    format_size_mb(profile.total_size_mb()),
                    format_minutes(profile.total_install_minutes())
                )
            )
        ),
    ];
    if !profile.tags.is_empty() {
        lines.push(format!("  {}", theme.format_field("Tags", &profile.tags.join(", "))));
    }

    let mut table = Table::new(vec!["Component", "Version", "Provider", "Size", "Depends on"])
        .align_right(3);
    for component in &profile.components {
        let depends: Vec<&str> = component.depends_on.iter().map(String::as_str).collect();
        table.add_row(&[
            component.id.clone(),
            component.version.to_string(),
            component.provider.to_string(),
            format_size_mb(component.size_mb),
            depends.join(", "),
        ]);
    }
    lines.push(String::new());
    lines.push(table.render());

    let conflicts: Vec<String> = profile
        .components
        .iter()
        .flat_map(|c| c.conflicts_with.iter().map(move |other| format!("{} ✕ {}", c.id, other)))
        .collect();
    if !conflicts.is_empty() {
        lines.push(format!("  {}", theme.format_field("Conflicts", &conflicts.join(", "))));
    }

    if !profile.verification.is_empty() {
        lines.push(String::new());
        lines.push(format!("  {}", theme.key.apply_to("Verification:")));
        for step in &profile.verification {
            lines.push(format!("    {} {}", step.name, theme.dim.apply_to(format!("$ {}", step.command))));
        }
    }

    if let Some(sample) = &profile.sample_project {
        lines.push(String::new());
        lines.push(format!("  {}", theme.format_field("Sample project", &sample.name)));
        if verbose {
            lines.push(format!("    {}", theme.dim.apply_to(&sample.description)));
            if let Some(entrypoint) = &sample.entrypoint {
                lines.push(format!("    {}", theme.dim.apply_to(format!("entrypoint: {}", entrypoint))));
            }
        }
    }

    lines
}
