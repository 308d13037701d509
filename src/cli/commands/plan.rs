//! The `devplan plan` command: profile the machine and build a plan.

use std::time::Duration;

use crate::cli::args::PlanArgs;
use crate::config::DevplanConfig;
use crate::error::Result;
use crate::plan::{InstallationPlan, PlanPolicy};
use crate::registry::Registry;
use crate::system::{SystemInfo, SystemProfiler};
use crate::ui::Output;

use super::dispatcher::{exit, Command, CommandResult};
use super::display::{plan_totals, requirement_lines, steps_table};

pub struct PlanCommand {
    registry: Registry,
    profiler: SystemProfiler,
    args: PlanArgs,
}

impl PlanCommand {
    pub fn new(config: &DevplanConfig, registry: Registry, args: PlanArgs) -> Self {
        let mut settings = config.profiler_settings();
        if let Some(secs) = args.timeout {
            settings.timeout = Duration::from_secs(secs.max(1));
        }
        let profiler = SystemProfiler::host().with_settings(settings);
        Self::with_profiler(registry, profiler, args)
    }

    pub fn with_profiler(registry: Registry, profiler: SystemProfiler, args: PlanArgs) -> Self {
        let registry = match args.disk_aggregation {
            Some(disk_aggregation) => registry.with_policy(PlanPolicy { disk_aggregation }),
            None => registry,
        };
        Self {
            registry,
            profiler,
            args,
        }
    }

    fn render(&self, output: &Output, system: &SystemInfo, plan: &InstallationPlan) {
        let theme = output.theme();

        output.status(&theme.format_header(&format!(
            "Installation plan for {} on {}",
            plan.profile_ids.join(", "),
            system.os
        )));
        output.status("");
        for line in requirement_lines(theme, plan) {
            output.status(&format!("  {}", line));
        }
        output.status("");

        output.line(&steps_table(theme, plan, output.mode().shows_detail()).render());
        output.line(&theme.format_field("Total", &plan_totals(plan)));

        let missing: Vec<String> = plan
            .missing_providers()
            .map(|s| s.component.provider.to_string())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        if !missing.is_empty() {
            output.warn(&format!("Providers not found on this machine: {}", missing.join(", ")));
        }
        for warning in &plan.warnings {
            output.warn(&warning.to_string());
        }

        if !plan.verification.is_empty() {
            output.status("");
            output.status(&format!("  {}", theme.key.apply_to("Verify with:")));
            for check in &plan.verification {
                output.status(&format!(
                    "    {} {}",
                    check.name,
                    theme.dim.apply_to(format!("$ {}", check.command))
                ));
            }
        }

        output.detail(&format!(
            "  {}",
            theme.dim.apply_to(format!(
                "manifest v{} ({}), disk aggregation: {}",
                plan.manifest_version,
                &plan.manifest_digest[..plan.manifest_digest.len().min(12)],
                plan.disk_aggregation
            ))
        ));
    }
}

impl Command for PlanCommand {
    fn execute(&self, output: &Output) -> Result<CommandResult> {
        let system = self.profiler.profile()?;
        let plan = self
            .registry
            .get_installation_plan(&self.args.profiles, &system)?;

        if output.is_json() {
            output.json(&plan)?;
        } else {
            self.render(output, &system, &plan);
        }

        if self.args.strict && !plan.satisfied {
            output.error(&format!(
                "This machine does not meet the requirements ({} violation(s))",
                plan.violations.len()
            ));
            return Ok(CommandResult::failure(exit::UNSATISFIED));
        }
        Ok(CommandResult::success())
    }
}
