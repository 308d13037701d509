//! Machine profiling.
//!
//! This module captures a [`SystemInfo`] snapshot of the current machine:
//!
//! - [`probe`] - The [`SystemProbe`] capability set and the real [`HostProbe`]
//! - [`fake`] - [`FakeProbe`] for deterministic, hermetic tests
//! - [`profiler`] - [`SystemProfiler`], which runs probes with individual timeouts
//! - [`package_manager`] - Package manager detection on PATH
//! - [`runtime`] - Installed language runtime detection
//! - [`command`] - Tool execution bounded by a timeout
//!
//! # Example
//!
//! ```
//! use devplan::profile::OsFamily;
//! use devplan::system::{FakeProbe, SystemProfiler};
//!
//! let probe = FakeProbe::new(OsFamily::Linux).with_ram_gb(4.0);
//! let info = SystemProfiler::new(probe).profile().unwrap();
//! assert_eq!(info.ram_gb, Some(4.0));
//! ```

pub mod command;
pub mod fake;
pub mod package_manager;
pub mod probe;
pub mod profiler;
pub mod runtime;

pub use fake::FakeProbe;
pub use package_manager::{detect_package_managers, ManagerKind, PackageManager};
pub use probe::{CpuInfo, HostProbe, MemoryInfo, OsRelease, SystemProbe};
pub use profiler::{ProfilerSettings, SystemProfiler};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::profile::OsFamily;

/// One system-fact-gathering operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    Os,
    Cpu,
    Ram,
    Disk,
    Gpu,
    PackageManagers,
    Runtimes,
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeKind::Os => "os",
            ProbeKind::Cpu => "cpu",
            ProbeKind::Ram => "ram",
            ProbeKind::Disk => "disk",
            ProbeKind::Gpu => "gpu",
            ProbeKind::PackageManagers => "package-managers",
            ProbeKind::Runtimes => "runtimes",
        };
        f.write_str(name)
    }
}

/// A probe that could not produce its value. Never fatal on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeError {
    /// The probe did not answer before its deadline.
    #[error("{probe} probe timed out after {after_ms}ms")]
    Timeout { probe: ProbeKind, after_ms: u64 },

    /// The probe ran but could not determine its value.
    #[error("{probe} probe failed: {message}")]
    Failed { probe: ProbeKind, message: String },
}

impl ProbeError {
    /// Shorthand for a [`ProbeError::Failed`].
    pub fn failed(probe: ProbeKind, message: impl Into<String>) -> Self {
        ProbeError::Failed {
            probe,
            message: message.into(),
        }
    }

    /// Which probe failed.
    pub fn probe(&self) -> ProbeKind {
        match self {
            ProbeError::Timeout { probe, .. } | ProbeError::Failed { probe, .. } => *probe,
        }
    }
}

/// Snapshot of machine facts, captured once per invocation.
///
/// Fields a probe could not determine are `None` ("unknown").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInfo {
    /// Operating system family. Always known.
    pub os: OsFamily,
    /// Distribution or product name (e.g., "Ubuntu").
    pub os_name: Option<String>,
    /// OS version string.
    pub os_version: Option<String>,
    /// CPU architecture (e.g., "x86_64", "aarch64").
    pub arch: Option<String>,
    /// Logical CPU cores.
    pub cpu_cores: Option<u32>,
    /// Total RAM in GB.
    pub ram_gb: Option<f64>,
    /// Currently available RAM in GB.
    pub available_ram_gb: Option<f64>,
    /// Free space on the install volume in GB.
    pub disk_free_gb: Option<f64>,
    /// Whether a discrete GPU was found.
    pub gpu_present: Option<bool>,
    /// Package managers found on PATH.
    pub package_managers: Option<BTreeSet<PackageManager>>,
    /// Installed runtimes, name to version.
    pub installed_runtimes: Option<BTreeMap<String, String>>,
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
    /// Probes that failed or timed out.
    pub probe_failures: Vec<ProbeError>,
}

impl SystemInfo {
    /// A snapshot where everything but the OS family is unknown.
    pub fn new(os: OsFamily) -> Self {
        Self {
            os,
            os_name: None,
            os_version: None,
            arch: None,
            cpu_cores: None,
            ram_gb: None,
            available_ram_gb: None,
            disk_free_gb: None,
            gpu_present: None,
            package_managers: None,
            installed_runtimes: None,
            captured_at: Utc::now(),
            probe_failures: Vec::new(),
        }
    }

    pub fn with_ram_gb(mut self, ram_gb: f64) -> Self {
        self.ram_gb = Some(ram_gb);
        self
    }

    pub fn with_cpu_cores(mut self, cores: u32) -> Self {
        self.cpu_cores = Some(cores);
        self
    }

    pub fn with_disk_free_gb(mut self, disk_free_gb: f64) -> Self {
        self.disk_free_gb = Some(disk_free_gb);
        self
    }

    pub fn with_gpu(mut self, present: bool) -> Self {
        self.gpu_present = Some(present);
        self
    }

    pub fn with_package_managers(mut self, managers: impl IntoIterator<Item = PackageManager>) -> Self {
        self.package_managers = Some(managers.into_iter().collect());
        self
    }

    /// Whether the given manager is known to be present.
    ///
    /// `None` when package manager detection did not run or failed.
    pub fn has_package_manager(&self, manager: PackageManager) -> Option<bool> {
        self.package_managers
            .as_ref()
            .map(|managers| managers.contains(&manager))
    }

    /// Installed version of a runtime, if detected.
    pub fn runtime_version(&self, name: &str) -> Option<&str> {
        self.installed_runtimes
            .as_ref()
            .and_then(|runtimes| runtimes.get(name))
            .map(|v| v.as_str())
    }

    /// Whether every probe answered.
    pub fn is_complete(&self) -> bool {
        self.probe_failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_snapshot_is_unknown_except_os() {
        let info = SystemInfo::new(OsFamily::Macos);
        assert_eq!(info.os, OsFamily::Macos);
        assert!(info.ram_gb.is_none());
        assert!(info.gpu_present.is_none());
        assert_eq!(info.has_package_manager(PackageManager::Homebrew), None);
        assert!(info.is_complete());
    }

    #[test]
    fn builders_fill_fields() {
        let info = SystemInfo::new(OsFamily::Linux)
            .with_ram_gb(8.0)
            .with_cpu_cores(4)
            .with_disk_free_gb(120.5)
            .with_gpu(false)
            .with_package_managers([PackageManager::Apt]);
        assert_eq!(info.ram_gb, Some(8.0));
        assert_eq!(info.cpu_cores, Some(4));
        assert_eq!(info.disk_free_gb, Some(120.5));
        assert_eq!(info.gpu_present, Some(false));
        assert_eq!(info.has_package_manager(PackageManager::Apt), Some(true));
        assert_eq!(info.has_package_manager(PackageManager::Npm), Some(false));
    }

    #[test]
    fn probe_error_display_names_probe() {
        let timeout = ProbeError::Timeout {
            probe: ProbeKind::Gpu,
            after_ms: 3000,
        };
        assert_eq!(timeout.to_string(), "gpu probe timed out after 3000ms");
        assert_eq!(timeout.probe(), ProbeKind::Gpu);

        let failed = ProbeError::failed(ProbeKind::Disk, "no volume");
        assert_eq!(failed.to_string(), "disk probe failed: no volume");
    }

    #[test]
    fn probe_error_serializes_with_kind_tag() {
        let json = serde_json::to_value(ProbeError::Timeout {
            probe: ProbeKind::PackageManagers,
            after_ms: 10,
        })
        .unwrap();
        assert_eq!(json["kind"], "timeout");
        assert_eq!(json["probe"], "package_managers");
    }
}
