//! Configuration loading for devplan.
//!
//! - Schema definitions in [`schema`]
//! - File discovery, loading, and environment overrides in [`loader`]
//! - Deep merging in [`merger`]
//!
//! # Example
//!
//! ```
//! use devplan::config::{load_config_files, ConfigPaths};
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".devplan");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "probe:\n  timeout_secs: 5\n").unwrap();
//!
//! let paths = ConfigPaths::discover_in(None, temp.path(), None);
//! let config = load_config_files(&paths).unwrap();
//! assert_eq!(config.probe.timeout_secs, 5);
//! ```
//!
//! # Configuration File Locations
//!
//! Merged in this order, later files winning:
//! 1. User global config (`~/.devplan/config.yml`)
//! 2. Project config (`.devplan/config.yml`)
//! 3. A file passed with `--config`
//!
//! `DEVPLAN_PROBE_TIMEOUT` and `DEVPLAN_INSTALL_ROOT` are applied last.

pub mod loader;
pub mod merger;
pub mod schema;

pub use loader::{
    apply_env_overrides, find_project_root, load_config, load_config_files, load_config_value,
    parse_config, resolve_paths, ConfigPaths, CONFIG_DIR, CONFIG_FILE, ENV_INSTALL_ROOT, ENV_PROBE_TIMEOUT,
};
pub use merger::{deep_merge, merge_layers};
pub use schema::{DevplanConfig, PlanningConfig, ProbeConfig};
