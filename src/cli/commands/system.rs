//! The `devplan system` command: profile this machine.

use std::time::Duration;

use crate::cli::args::SystemArgs;
use crate::config::DevplanConfig;
use crate::error::Result;
use crate::system::SystemProfiler;
use crate::ui::Output;

use super::dispatcher::{Command, CommandResult};
use super::display::system_lines;

pub struct SystemCommand {
    profiler: SystemProfiler,
}

impl SystemCommand {
    /// Profile the host with config settings, adjusted by `args`.
    pub fn new(config: &DevplanConfig, args: &SystemArgs) -> Self {
        let mut settings = config.profiler_settings();
        if let Some(secs) = args.timeout {
            settings.timeout = Duration::from_secs(secs.max(1));
        }
        if args.no_runtimes {
            settings.detect_runtimes = false;
        }
        Self::with_profiler(SystemProfiler::host().with_settings(settings))
    }

    pub fn with_profiler(profiler: SystemProfiler) -> Self {
        Self { profiler }
    }
}

impl Command for SystemCommand {
    fn execute(&self, output: &Output) -> Result<CommandResult> {
        let info = self.profiler.profile()?;

        if output.is_json() {
            output.json(&info)?;
            return Ok(CommandResult::success());
        }

        let theme = output.theme();
        output.status(&theme.format_header("This machine"));
        for line in system_lines(theme, &info) {
            output.line(&format!("  {}", line));
        }

        if !info.probe_failures.is_empty() {
            output.status("");
            for failure in &info.probe_failures {
                output.status(&format!("  {}", theme.format_unknown(&failure.to_string())));
            }
        }
        output.detail(&format!(
            "  {}",
            theme.dim.apply_to(format!(
                "captured {} (install root {})",
                info.captured_at.to_rfc3339(),
                self.profiler.settings().install_root.display()
            ))
        ));

        Ok(CommandResult::success())
    }
}
