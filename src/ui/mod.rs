//! Terminal output for the CLI.
//!
//! - [`Output`] routes lines by [`OutputMode`] and switches to JSON
//! - [`DevplanTheme`] holds the styles
//! - [`Table`] renders box-drawn tables
//!
//! # Example
//!
//! ```
//! use devplan::ui::{DevplanTheme, Output, OutputMode, Table};
//!
//! let output = Output::new(OutputMode::Quiet, false, DevplanTheme::plain());
//! let mut table = Table::new(vec!["Profile", "Components"]);
//! table.add_row(&["web-nextjs", "5"]);
//! output.line(&table.render());
//! ```

pub mod output;
pub mod table;
pub mod theme;

pub use output::{Output, OutputMode};
pub use table::{Align, Table};
pub use theme::{should_use_colors, DevplanTheme};

/// Human size for a megabyte count: `850 MB`, `2.4 GB`.
pub fn format_size_mb(mb: u64) -> String {
    if mb < 1024 {
        format!("{} MB", mb)
    } else {
        format!("{:.1} GB", mb as f64 / 1024.0)
    }
}

/// Human duration for a minute count: `45 min`, `1 h 5 min`, `2 h`.
pub fn format_minutes(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{} min", m),
        (h, 0) => format!("{} h", h),
        (h, m) => format!("{} h {} min", h, m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(format_size_mb(0), "0 MB");
        assert_eq!(format_size_mb(850), "850 MB");
        assert_eq!(format_size_mb(1024), "1.0 GB");
        assert_eq!(format_size_mb(2458), "2.4 GB");
    }

    #[test]
    fn minutes() {
        assert_eq!(format_minutes(0), "0 min");
        assert_eq!(format_minutes(45), "45 min");
        assert_eq!(format_minutes(60), "1 h");
        assert_eq!(format_minutes(65), "1 h 5 min");
    }
}
