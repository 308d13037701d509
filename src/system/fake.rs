//! Deterministic probe for tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::thread;
use std::time::Duration;

use super::probe::{CpuInfo, MemoryInfo, OsRelease, SystemProbe};
use super::{PackageManager, ProbeError, ProbeKind};
use crate::profile::OsFamily;

/// A [`SystemProbe`] that answers from canned values.
///
/// Individual probes can be made to fail or to sleep past any deadline.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use devplan::profile::OsFamily;
/// use devplan::system::{FakeProbe, ProbeKind};
///
/// let probe = FakeProbe::new(OsFamily::Macos)
///     .with_ram_gb(32.0)
///     .failing(ProbeKind::Gpu, "no driver")
///     .hanging(ProbeKind::Disk, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct FakeProbe {
    family: Option<OsFamily>,
    release: OsRelease,
    cpu: CpuInfo,
    memory: MemoryInfo,
    disk_free_gb: f64,
    gpu: bool,
    package_managers: BTreeSet<PackageManager>,
    runtimes: BTreeMap<String, String>,
    failures: HashMap<ProbeKind, String>,
    delays: HashMap<ProbeKind, Duration>,
}

impl FakeProbe {
    /// A healthy machine: 8 cores, 16 GB RAM, 100 GB free, no GPU.
    pub fn new(os: OsFamily) -> Self {
        Self {
            family: Some(os),
            release: OsRelease::default(),
            cpu: CpuInfo {
                arch: "x86_64".to_string(),
                cores: 8,
            },
            memory: MemoryInfo {
                total_gb: 16.0,
                available_gb: Some(12.0),
            },
            disk_free_gb: 100.0,
            gpu: false,
            package_managers: BTreeSet::new(),
            runtimes: BTreeMap::new(),
            failures: HashMap::new(),
            delays: HashMap::new(),
        }
    }

    /// A machine whose OS family cannot be identified.
    pub fn unidentified() -> Self {
        let mut probe = Self::new(OsFamily::Linux);
        probe.family = None;
        probe
    }

    pub fn with_os_version(mut self, name: &str, version: &str) -> Self {
        self.release = OsRelease {
            name: Some(name.to_string()),
            version: Some(version.to_string()),
        };
        self
    }

    pub fn with_cpu_cores(mut self, cores: u32) -> Self {
        self.cpu.cores = cores;
        self
    }

    pub fn with_ram_gb(mut self, total_gb: f64) -> Self {
        self.memory.total_gb = total_gb;
        self.memory.available_gb = Some(total_gb * 0.75);
        self
    }

    pub fn with_disk_free_gb(mut self, free_gb: f64) -> Self {
        self.disk_free_gb = free_gb;
        self
    }

    pub fn with_gpu(mut self, present: bool) -> Self {
        self.gpu = present;
        self
    }

    pub fn with_package_managers(mut self, managers: impl IntoIterator<Item = PackageManager>) -> Self {
        self.package_managers.extend(managers);
        self
    }

    pub fn with_runtime(mut self, name: &str, version: &str) -> Self {
        self.runtimes.insert(name.to_string(), version.to_string());
        self
    }

    /// Make one probe fail with `message`.
    pub fn failing(mut self, kind: ProbeKind, message: &str) -> Self {
        self.failures.insert(kind, message.to_string());
        self
    }

    /// Make one probe sleep for `delay` before answering.
    ///
    /// `ProbeKind::Os` delays the release lookup; the family always answers
    /// at once.
    pub fn hanging(mut self, kind: ProbeKind, delay: Duration) -> Self {
        self.delays.insert(kind, delay);
        self
    }

    fn answer<T>(&self, kind: ProbeKind, value: T) -> Result<T, ProbeError> {
        if let Some(delay) = self.delays.get(&kind) {
            thread::sleep(*delay);
        }
        match self.failures.get(&kind) {
            Some(message) => Err(ProbeError::failed(kind, message.clone())),
            None => Ok(value),
        }
    }
}

impl SystemProbe for FakeProbe {
    fn os_family(&self) -> Result<OsFamily, ProbeError> {
        self.family
            .ok_or_else(|| ProbeError::failed(ProbeKind::Os, "unrecognized platform"))
    }

    fn probe_os_release(&self) -> Result<OsRelease, ProbeError> {
        self.answer(ProbeKind::Os, self.release.clone())
    }

    fn probe_cpu(&self) -> Result<CpuInfo, ProbeError> {
        self.answer(ProbeKind::Cpu, self.cpu.clone())
    }

    fn probe_ram(&self) -> Result<MemoryInfo, ProbeError> {
        self.answer(ProbeKind::Ram, self.memory)
    }

    fn probe_disk(&self, _target: &Path) -> Result<f64, ProbeError> {
        self.answer(ProbeKind::Disk, self.disk_free_gb)
    }

    fn probe_gpu(&self) -> Result<bool, ProbeError> {
        self.answer(ProbeKind::Gpu, self.gpu)
    }

    fn probe_package_managers(&self) -> Result<BTreeSet<PackageManager>, ProbeError> {
        self.answer(ProbeKind::PackageManagers, self.package_managers.clone())
    }

    fn probe_runtimes(&self) -> Result<BTreeMap<String, String>, ProbeError> {
        self.answer(ProbeKind::Runtimes, self.runtimes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_healthy() {
        let probe = FakeProbe::new(OsFamily::Linux);
        assert_eq!(probe.os_family().unwrap(), OsFamily::Linux);
        assert_eq!(probe.probe_os_release().unwrap(), OsRelease::default());
        assert_eq!(probe.probe_cpu().unwrap().cores, 8);
        assert_eq!(probe.probe_ram().unwrap().total_gb, 16.0);
        assert_eq!(probe.probe_disk(Path::new("/")).unwrap(), 100.0);
        assert!(!probe.probe_gpu().unwrap());
    }

    #[test]
    fn failing_probe_returns_error() {
        let probe = FakeProbe::new(OsFamily::Linux).failing(ProbeKind::Gpu, "no driver");
        assert_eq!(
            probe.probe_gpu(),
            Err(ProbeError::failed(ProbeKind::Gpu, "no driver"))
        );
        assert!(probe.probe_cpu().is_ok());
    }

    #[test]
    fn unidentified_os_fails() {
        assert!(FakeProbe::unidentified().os_family().is_err());
    }

    #[test]
    fn builders_override_values() {
        let probe = FakeProbe::new(OsFamily::Windows)
            .with_ram_gb(4.0)
            .with_runtime("node", "18.19.0")
            .with_package_managers([PackageManager::Winget]);
        assert_eq!(probe.probe_ram().unwrap().total_gb, 4.0);
        assert_eq!(probe.probe_runtimes().unwrap()["node"], "18.19.0");
        assert!(probe
            .probe_package_managers()
            .unwrap()
            .contains(&PackageManager::Winget));
    }
}
