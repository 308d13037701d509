//! Error types for devplan operations.
//!
//! This module defines [`DevplanError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Structural problems (schema, cycles, conflicts) abort planning outright
//! - Resource shortfalls are never errors; they travel inside the plan as
//!   [`Violation`](crate::requirements::Violation)s
//! - Per-probe failures are recorded on the snapshot as
//!   [`ProbeError`](crate::system::ProbeError)s
//! - Every variant carries structured fields so callers can render messages
//!   without parsing strings

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Core error type for devplan operations.
#[derive(Debug, Error)]
pub enum DevplanError {
    /// Requested profile id is not in the registry.
    #[error("Unknown profile: {id}{}", format_suggestions(.suggestions))]
    ProfileNotFound {
        id: String,
        suggestions: Vec<String>,
    },

    /// One or more manifest documents failed schema validation.
    #[error("Invalid profile manifest ({} problem(s)):\n{}", .violations.len(), format_violations(.violations))]
    Schema { violations: Vec<SchemaViolation> },

    /// The dependency graph of the requested components contains a cycle.
    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    /// Two requested components declare a conflict with each other.
    #[error("Component '{component}' (from '{profile}') conflicts with '{conflicts_with}'")]
    Conflict {
        component: String,
        conflicts_with: String,
        profile: String,
    },

    /// The operating system family could not be determined.
    #[error("Unable to determine the operating system: {reason}")]
    PlatformUndetected { reason: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for devplan operations.
pub type Result<T> = std::result::Result<T, DevplanError>;

/// A single offending field found while validating a manifest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    /// Where the document came from (embedded path or file on disk).
    pub origin: String,
    /// Profile id, when the document got far enough to declare one.
    pub profile: Option<String>,
    /// Dotted path to the field, e.g. `components[2].size_mb`.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.profile {
            Some(profile) => write!(
                f,
                "{} [{}] {}: {}",
                self.origin, profile, self.field, self.message
            ),
            None => write!(f, "{} {}: {}", self.origin, self.field, self.message),
        }
    }
}

fn format_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {}", v))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}
