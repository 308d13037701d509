//! Requirement checking.
//!
//! Compares a [`SystemInfo`](crate::system::SystemInfo) snapshot against the
//! resource floors of one or more profiles. Shortfalls are reported as
//! [`Violation`]s and never abort anything on their own.
//!
//! # Modules
//!
//! - [`validator`] - Field-by-field validation and requirement aggregation

pub mod validator;

pub use validator::{
    aggregate, format_gb, validate, DiskAggregation, Measure, RequirementField, ValidationResult,
    Violation,
};
