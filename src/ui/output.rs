//! Output mode and writer.

use std::str::FromStr;

use serde::Serialize;

use super::theme::DevplanTheme;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Include secondary detail (probe failures, per-step providers).
    Verbose,
    #[default]
    Normal,
    /// Only the primary result and errors.
    Quiet,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Pick a mode from the `--verbose` / `--quiet` flags. Quiet wins.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    pub fn shows_detail(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Headers, hints, and other decoration around the primary result.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Quiet)
    }
}

/// Output writer that respects output mode and format.
///
/// Everything goes to stdout except warnings and errors, which go to stderr
/// so JSON output stays parseable.
#[derive(Debug, Clone)]
pub struct Output {
    mode: OutputMode,
    json: bool,
    theme: DevplanTheme,
}

impl Output {
    pub fn new(mode: OutputMode, json: bool, theme: DevplanTheme) -> Self {
        Self { mode, json, theme }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn theme(&self) -> &DevplanTheme {
        &self.theme
    }

    /// Primary result line. Always printed in human mode.
    pub fn line(&self, msg: &str) {
        if !self.json {
            println!("{}", msg);
        }
    }

    /// Decoration line, dropped in quiet mode.
    pub fn status(&self, msg: &str) {
        if !self.json && self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    /// Detail line, printed only in verbose mode.
    pub fn detail(&self, msg: &str) {
        if !self.json && self.mode.shows_detail() {
            println!("{}", msg);
        }
    }

    pub fn warn(&self, msg: &str) {
        eprintln!("{}", self.theme.format_warning(msg));
    }

    pub fn error(&self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    /// Print `value` as pretty JSON. Does nothing in human mode.
    pub fn json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(())
    }
}
