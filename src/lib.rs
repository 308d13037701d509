//! devplan - Profile a developer machine and plan development stack installs.
//!
//! devplan ships a registry of declarative profiles (a web stack, an ML
//! stack, a Rust toolchain, ...), measures the current machine, and turns a
//! list of requested profiles into an ordered, validated installation plan
//! that an installer can execute.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and merging
//! - [`error`] - Error types and result aliases
//! - [`plan`] - Installation plans and the planning lifecycle
//! - [`profile`] - Profile and component data model, document parsing
//! - [`registry`] - Loaded profiles: lookup, search, planning entry point
//! - [`requirements`] - Checking a machine against resource requirements
//! - [`resolver`] - Component merging, conflict checks, install ordering
//! - [`system`] - Machine profiling behind a fakeable probe trait
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use devplan::profile::OsFamily;
//! use devplan::registry::Registry;
//! use devplan::system::{FakeProbe, SystemProfiler};
//!
//! let registry = Registry::load_all().unwrap();
//! let machine = SystemProfiler::new(FakeProbe::new(OsFamily::Linux).with_ram_gb(8.0))
//!     .profile()
//!     .unwrap();
//!
//! let plan = registry
//!     .get_installation_plan(&["web-nextjs", "ml-python"], &machine)
//!     .unwrap();
//! assert!(!plan.satisfied);
//! assert_eq!(plan.violations[0].to_string(), "ram_gb: requires 16 GB, found 8 GB");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod plan;
pub mod profile;
pub mod registry;
pub mod requirements;
pub mod resolver;
pub mod system;
pub mod ui;

pub use error::{DevplanError, Result, SchemaViolation};
