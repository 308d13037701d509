//! Visual theme and styling.

use console::Style;

/// Terminal styles used by every command.
#[derive(Debug, Clone)]
pub struct DevplanTheme {
    /// Satisfied checks (green).
    pub success: Style,
    /// Warnings and unverified values (orange).
    pub warning: Style,
    /// Errors and violations (red bold).
    pub error: Style,
    /// Secondary text.
    pub dim: Style,
    pub highlight: Style,
    /// Section headers (cyan bold).
    pub header: Style,
    /// Key labels in key-value displays.
    pub key: Style,
    /// Component and profile ids.
    pub id: Style,
    /// Step positions like `[3/12]`.
    pub step_number: Style,
}

impl Default for DevplanTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl DevplanTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().cyan(),
            key: Style::new().bold(),
            id: Style::new().cyan(),
            step_number: Style::new().dim(),
        }
    }

    /// A theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            key: Style::new(),
            id: Style::new(),
            step_number: Style::new(),
        }
    }

    /// Colored unless `no_color` is set or stdout isn't a terminal.
    pub fn for_terminal(no_color: bool) -> Self {
        if no_color || !should_use_colors() {
            Self::plain()
        } else {
            Self::new()
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// A value that couldn't be determined.
    pub fn format_unknown(&self, msg: &str) -> String {
        format!("{}", self.dim.apply_to(format!("? {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }

    /// `Label: value` with a bold label.
    pub fn format_field(&self, label: &str, value: &str) -> String {
        format!("{} {}", self.key.apply_to(format!("{}:", label)), value)
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    console::Term::stdout().is_term()
}
