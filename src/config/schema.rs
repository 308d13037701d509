//! Configuration schema.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::requirements::DiskAggregation;
use crate::system::profiler::{default_install_root, ProfilerSettings};

/// Root configuration.
///
/// ```yaml
/// probe:
///   timeout_secs: 3
///   runtimes: true
/// planning:
///   disk_aggregation: sum
/// install_root: /data
/// profile_dirs:
///   - ~/my-profiles
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevplanConfig {
    pub probe: ProbeConfig,
    pub planning: PlanningConfig,
    /// Directory whose volume is checked for free disk. Defaults to home.
    pub install_root: Option<PathBuf>,
    /// Extra directories of profile documents, layered over the built-ins.
    pub profile_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Per-probe deadline in seconds.
    pub timeout_secs: u64,
    /// Whether to look for installed language runtimes.
    pub runtimes: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 3,
            runtimes: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanningConfig {
    pub disk_aggregation: DiskAggregation,
}

impl DevplanConfig {
    /// Settings for a [`SystemProfiler`](crate::system::SystemProfiler).
    pub fn profiler_settings(&self) -> ProfilerSettings {
        ProfilerSettings {
            timeout: Duration::from_secs(self.probe.timeout_secs),
            install_root: self
                .install_root
                .clone()
                .unwrap_or_else(default_install_root),
            detect_runtimes: self.probe.runtimes,
        }
    }
}
