//! The probe capability set and the host implementation.
//!
//! [`SystemProbe`] is the seam between profiling and the real machine. The
//! [`SystemProfiler`](super::SystemProfiler) only talks to this trait, so tests
//! swap in [`FakeProbe`](super::FakeProbe) and never touch the host.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use sysinfo::{Disks, System};

use super::command::{run_tool, TOOL_TIMEOUT};
use super::package_manager::{detect_package_managers, parse_system_path, resolve_tool_path};
use super::runtime::detect_runtimes;
use super::{PackageManager, ProbeError, ProbeKind};
use crate::profile::OsFamily;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Distribution name and release, when the platform reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OsRelease {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Processor facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuInfo {
    pub arch: String,
    pub cores: u32,
}

/// Memory facts in GB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MemoryInfo {
    pub total_gb: f64,
    pub available_gb: Option<f64>,
}

/// Operations that gather facts about the machine.
///
/// Implementations must be shareable across threads: the profiler runs each
/// probe on its own thread.
pub trait SystemProbe: Send + Sync {
    /// The OS family. Answered inline, without a deadline.
    fn os_family(&self) -> Result<OsFamily, ProbeError>;

    fn probe_os_release(&self) -> Result<OsRelease, ProbeError>;

    fn probe_cpu(&self) -> Result<CpuInfo, ProbeError>;

    fn probe_ram(&self) -> Result<MemoryInfo, ProbeError>;

    /// Free space in GB on the volume holding `target`.
    fn probe_disk(&self, target: &Path) -> Result<f64, ProbeError>;

    /// Whether a discrete GPU is present.
    fn probe_gpu(&self) -> Result<bool, ProbeError>;

    fn probe_package_managers(&self) -> Result<BTreeSet<PackageManager>, ProbeError>;

    /// Installed runtimes mapped to their versions.
    fn probe_runtimes(&self) -> Result<BTreeMap<String, String>, ProbeError>;
}

/// Probes the machine this process runs on.
#[derive(Debug, Clone)]
pub struct HostProbe {
    path_entries: Vec<PathBuf>,
}

impl HostProbe {
    /// Probe using the process PATH.
    pub fn new() -> Self {
        Self {
            path_entries: parse_system_path(),
        }
    }

    /// Probe using an explicit PATH.
    pub fn with_path(path_entries: Vec<PathBuf>) -> Self {
        Self { path_entries }
    }

    fn has_tool(&self, tool: &str) -> bool {
        resolve_tool_path(tool, &self.path_entries).is_some()
    }

    /// Run a tool from PATH and return stdout when it succeeds.
    fn tool_output(&self, tool: &str, args: &[&str]) -> Option<String> {
        let path = resolve_tool_path(tool, &self.path_entries)?;
        let output = run_tool(&path, args, TOOL_TIMEOUT)?;
        output.success.then_some(output.stdout)
    }
}

impl Default for HostProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe for HostProbe {
    fn os_family(&self) -> Result<OsFamily, ProbeError> {
        OsFamily::current().ok_or_else(|| {
            ProbeError::failed(
                ProbeKind::Os,
                format!("unsupported operating system '{}'", std::env::consts::OS),
            )
        })
    }

    fn probe_os_release(&self) -> Result<OsRelease, ProbeError> {
        Ok(OsRelease {
            name: System::name(),
            version: System::os_version(),
        })
    }

    fn probe_cpu(&self) -> Result<CpuInfo, ProbeError> {
        let cores = num_cpus::get();
        if cores == 0 {
            return Err(ProbeError::failed(ProbeKind::Cpu, "no logical cores reported"));
        }
        Ok(CpuInfo {
            arch: std::env::consts::ARCH.to_string(),
            cores: u32::try_from(cores).unwrap_or(u32::MAX),
        })
    }

    fn probe_ram(&self) -> Result<MemoryInfo, ProbeError> {
        let mut sys = System::new();
        sys.refresh_memory();

        let total = sys.total_memory();
        if total == 0 {
            return Err(ProbeError::failed(ProbeKind::Ram, "total memory reported as 0"));
        }

        let available = sys.available_memory();
        Ok(MemoryInfo {
            total_gb: installed_ram_gb(total),
            available_gb: (available > 0).then(|| available as f64 / BYTES_PER_GB),
        })
    }

    fn probe_disk(&self, target: &Path) -> Result<f64, ProbeError> {
        let disks = Disks::new_with_refreshed_list();
        let mounts: Vec<(PathBuf, u64)> = disks
            .list()
            .iter()
            .map(|disk| (disk.mount_point().to_path_buf(), disk.available_space()))
            .collect();

        let target = target.canonicalize().unwrap_or_else(|_| target.to_path_buf());
        free_space_for(&target, &mounts)
            .map(|bytes| bytes as f64 / BYTES_PER_GB)
            .ok_or_else(|| {
                ProbeError::failed(
                    ProbeKind::Disk,
                    format!("no mounted volume contains {}", target.display()),
                )
            })
    }

    fn probe_gpu(&self) -> Result<bool, ProbeError> {
        let mut answered = false;

        if let Some(vendors) = read_pci_display_vendors() {
            if vendors.iter().any(|v| is_discrete_vendor(v)) {
                return Ok(true);
            }
            answered = true;
        }

        if self.has_tool("nvidia-smi") {
            if let Some(out) = self.tool_output("nvidia-smi", &["--list-gpus"]) {
                if !out.trim().is_empty() {
                    return Ok(true);
                }
            }
            answered = true;
        }

        #[cfg(target_os = "linux")]
        if self.has_tool("lspci") {
            if let Some(out) = self.tool_output("lspci", &[]) {
                let lower = out.to_lowercase();
                if lower.contains("nvidia") || lower.contains("radeon") {
                    return Ok(true);
                }
                answered = true;
            }
        }

        #[cfg(target_os = "macos")]
        {
            // Apple Silicon always ships an integrated GPU usable for Metal.
            if cfg!(target_arch = "aarch64") {
                return Ok(true);
            }
            if let Some(out) = self.tool_output("system_profiler", &["SPDisplaysDataType"]) {
                let lower = out.to_lowercase();
                return Ok(lower.contains("radeon") || lower.contains("nvidia"));
            }
        }

        #[cfg(target_os = "windows")]
        if let Some(out) = self.tool_output("wmic", &["path", "win32_VideoController", "get", "name"]) {
            let lower = out.to_lowercase();
            return Ok(lower.contains("nvidia") || lower.contains("radeon"));
        }

        if answered {
            Ok(false)
        } else {
            Err(ProbeError::failed(ProbeKind::Gpu, "no GPU detection method available"))
        }
    }

    fn probe_package_managers(&self) -> Result<BTreeSet<PackageManager>, ProbeError> {
        Ok(detect_package_managers(&self.path_entries))
    }

    fn probe_runtimes(&self) -> Result<BTreeMap<String, String>, ProbeError> {
        Ok(detect_runtimes(&self.path_entries, TOOL_TIMEOUT))
    }
}

/// Installed RAM in whole GB.
///
/// Firmware and integrated graphics reserve part of physical memory, so a
/// 16 GB machine reports around 15.5 GiB. Rounding to the nearest GB
/// recovers the installed size.
pub fn installed_ram_gb(total_bytes: u64) -> f64 {
    (total_bytes as f64 / BYTES_PER_GB).round()
}

/// Free bytes of the mount whose path is the longest prefix of `target`.
pub fn free_space_for(target: &Path, mounts: &[(PathBuf, u64)]) -> Option<u64> {
    mounts
        .iter()
        .filter(|(mount, _)| target.starts_with(mount))
        .max_by_key(|(mount, _)| mount.components().count())
        .map(|(_, free)| *free)
}

/// PCI vendor ids of display devices, when sysfs exposes them.
#[cfg(target_os = "linux")]
fn read_pci_display_vendors() -> Option<Vec<String>> {
    let entries = std::fs::read_dir("/sys/class/drm").ok()?;
    let vendors = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with("card") && !name.contains('-')
        })
        .filter_map(|entry| std::fs::read_to_string(entry.path().join("device/vendor")).ok())
        .map(|v| v.trim().to_lowercase())
        .collect();
    Some(vendors)
}

#[cfg(not(target_os = "linux"))]
fn read_pci_display_vendors() -> Option<Vec<String>> {
    None
}

/// NVIDIA and AMD. Intel parts are integrated and don't count.
fn is_discrete_vendor(vendor_id: &str) -> bool {
    matches!(vendor_id, "0x10de" | "0x1002")
}
