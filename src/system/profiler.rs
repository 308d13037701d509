//! Runs probes concurrently, each bounded by its own deadline.

use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;

use super::probe::{HostProbe, SystemProbe};
use super::{ProbeError, ProbeKind, SystemInfo};
use crate::error::{DevplanError, Result};

/// Default per-probe deadline.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// How the profiler runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilerSettings {
    /// Deadline for each individual probe.
    pub timeout: Duration,
    /// Directory whose volume the disk probe measures.
    pub install_root: PathBuf,
    /// Whether to look for installed runtimes.
    pub detect_runtimes: bool,
}

impl Default for ProfilerSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PROBE_TIMEOUT,
            install_root: default_install_root(),
            detect_runtimes: true,
        }
    }
}

/// The user's home directory, or the working directory when there is none.
pub fn default_install_root() -> PathBuf {
    dirs::home_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Captures [`SystemInfo`] snapshots.
pub struct SystemProfiler {
    probe: Arc<dyn SystemProbe>,
    settings: ProfilerSettings,
}

/// A probe running on its own thread.
struct PendingProbe<T> {
    kind: ProbeKind,
    rx: mpsc::Receiver<std::result::Result<T, ProbeError>>,
    deadline: Instant,
    timeout: Duration,
}

impl<T> PendingProbe<T> {
    /// Wait until the probe answers or its deadline passes.
    ///
    /// A probe that misses its deadline keeps running detached; its answer is
    /// dropped when it eventually sends.
    fn wait(self) -> std::result::Result<T, ProbeError> {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        match self.rx.recv_timeout(remaining) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ProbeError::Timeout {
                probe: self.kind,
                after_ms: self.timeout.as_millis() as u64,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(ProbeError::failed(
                self.kind,
                "probe exited without reporting a result",
            )),
        }
    }
}

impl SystemProfiler {
    /// Profile with the given probe and default settings.
    pub fn new(probe: impl SystemProbe + 'static) -> Self {
        Self {
            probe: Arc::new(probe),
            settings: ProfilerSettings::default(),
        }
    }

    /// Profile the host machine.
    pub fn host() -> Self {
        Self::new(HostProbe::new())
    }

    pub fn with_settings(mut self, settings: ProfilerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    pub fn settings(&self) -> &ProfilerSettings {
        &self.settings
    }

    /// Capture a snapshot.
    ///
    /// Failed or timed-out probes leave their fields unknown and are listed in
    /// [`SystemInfo::probe_failures`]. Only an unidentifiable OS family is an
    /// error.
    pub fn profile(&self) -> Result<SystemInfo> {
        let started = Instant::now();
        let timeout = self.settings.timeout;

        let family = self
            .probe
            .os_family()
            .map_err(|e| DevplanError::PlatformUndetected {
                reason: e.to_string(),
            })?;

        let release = self.spawn(ProbeKind::Os, |p| p.probe_os_release());
        let cpu = self.spawn(ProbeKind::Cpu, |p| p.probe_cpu());
        let memory = self.spawn(ProbeKind::Ram, |p| p.probe_ram());
        let install_root = self.settings.install_root.clone();
        let disk = self.spawn(ProbeKind::Disk, move |p| p.probe_disk(&install_root));
        let gpu = self.spawn(ProbeKind::Gpu, |p| p.probe_gpu());
        let managers = self.spawn(ProbeKind::PackageManagers, |p| p.probe_package_managers());
        let runtimes = self
            .settings
            .detect_runtimes
            .then(|| self.spawn(ProbeKind::Runtimes, |p| p.probe_runtimes()));

        let mut failures = Vec::new();
        let mut info = SystemInfo::new(family);
        if let Some(release) = collect(release, &mut failures) {
            info.os_name = release.name;
            info.os_version = release.version;
        }

        if let Some(cpu) = collect(cpu, &mut failures) {
            info.arch = Some(cpu.arch);
            info.cpu_cores = Some(cpu.cores);
        }
        if let Some(memory) = collect(memory, &mut failures) {
            info.ram_gb = Some(memory.total_gb);
            info.available_ram_gb = memory.available_gb;
        }
        info.disk_free_gb = collect(disk, &mut failures);
        info.gpu_present = collect(gpu, &mut failures);
        info.package_managers = collect(managers, &mut failures);
        info.installed_runtimes = runtimes.and_then(|pending| collect(pending, &mut failures));

        info.captured_at = Utc::now();
        info.probe_failures = failures;

        tracing::debug!(
            "Profiled {} in {}ms ({} probe failures, timeout {}ms)",
            info.os,
            started.elapsed().as_millis(),
            info.probe_failures.len(),
            timeout.as_millis()
        );

        Ok(info)
    }

    fn spawn<T, F>(&self, kind: ProbeKind, run: F) -> PendingProbe<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn SystemProbe) -> std::result::Result<T, ProbeError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let probe = Arc::clone(&self.probe);
        let deadline = Instant::now() + self.settings.timeout;

        let spawned = thread::Builder::new()
            .name(format!("probe-{}", kind))
            .spawn(move || {
                // The receiver is gone if the deadline already passed.
                let _ = tx.send(run(probe.as_ref()));
            });
        if let Err(e) = spawned {
            tracing::warn!("Could not start {} probe: {}", kind, e);
        }

        PendingProbe {
            kind,
            rx,
            deadline,
            timeout: self.settings.timeout,
        }
    }
}

fn collect<T>(pending: PendingProbe<T>, failures: &mut Vec<ProbeError>) -> Option<T> {
    match pending.wait() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!("{}", err);
            failures.push(err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::OsFamily;
    use crate::system::{FakeProbe, PackageManager};

    #[test]
    fn healthy_probe_fills_every_field() {
        let probe = FakeProbe::new(OsFamily::Linux)
            .with_os_version("Ubuntu", "22.04")
            .with_gpu(true)
            .with_package_managers([PackageManager::Apt])
            .with_runtime("python", "3.11.7");
        let info = SystemProfiler::new(probe).profile().unwrap();

        assert_eq!(info.os, OsFamily::Linux);
        assert_eq!(info.os_version.as_deref(), Some("22.04"));
        assert_eq!(info.cpu_cores, Some(8));
        assert_eq!(info.ram_gb, Some(16.0));
        assert_eq!(info.disk_free_gb, Some(100.0));
        assert_eq!(info.gpu_present, Some(true));
        assert_eq!(info.has_package_manager(PackageManager::Apt), Some(true));
        assert_eq!(info.runtime_version("python"), Some("3.11.7"));
        assert!(info.is_complete());
    }

    #[test]
    fn failed_probe_leaves_field_unknown() {
        let probe = FakeProbe::new(OsFamily::Macos).failing(ProbeKind::Ram, "sysctl denied");
        let info = SystemProfiler::new(probe).profile().unwrap();

        assert_eq!(info.ram_gb, None);
        assert_eq!(info.cpu_cores, Some(8));
        assert_eq!(
            info.probe_failures,
            vec![ProbeError::failed(ProbeKind::Ram, "sysctl denied")]
        );
    }

    #[test]
    fn hanging_probe_times_out_without_blocking_others() {
        let probe = FakeProbe::new(OsFamily::Linux)
            .hanging(ProbeKind::PackageManagers, Duration::from_secs(30));
        let started = Instant::now();
        let info = SystemProfiler::new(probe)
            .with_timeout(Duration::from_millis(200))
            .profile()
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(info.package_managers, None);
        assert_eq!(info.ram_gb, Some(16.0));
        assert_eq!(
            info.probe_failures,
            vec![ProbeError::Timeout {
                probe: ProbeKind::PackageManagers,
                after_ms: 200
            }]
        );
    }

    #[test]
    fn slow_os_release_lookup_is_not_fatal() {
        let probe = FakeProbe::new(OsFamily::Linux)
            .with_os_version("Ubuntu", "22.04")
            .hanging(ProbeKind::Os, Duration::from_secs(5));
        let info = SystemProfiler::new(probe)
            .with_timeout(Duration::from_millis(100))
            .profile()
            .unwrap();

        assert_eq!(info.os, OsFamily::Linux);
        assert_eq!(info.os_version, None);
        assert_eq!(info.os_name, None);
        assert_eq!(info.ram_gb, Some(16.0));
        assert_eq!(
            info.probe_failures,
            vec![ProbeError::Timeout {
                probe: ProbeKind::Os,
                after_ms: 100
            }]
        );
    }

    #[test]
    fn unidentified_os_is_fatal() {
        let err = SystemProfiler::new(FakeProbe::unidentified())
            .profile()
            .unwrap_err();
        assert!(matches!(err, DevplanError::PlatformUndetected { .. }));
    }

    #[test]
    fn runtime_detection_can_be_disabled() {
        let probe = FakeProbe::new(OsFamily::Linux).with_runtime("node", "20.1.0");
        let settings = ProfilerSettings {
            detect_runtimes: false,
            ..ProfilerSettings::default()
        };
        let info = SystemProfiler::new(probe).with_settings(settings).profile().unwrap();
        assert_eq!(info.installed_runtimes, None);
        assert!(info.is_complete());
    }

    #[test]
    fn default_settings_use_three_second_timeout() {
        let settings = ProfilerSettings::default();
        assert_eq!(settings.timeout, Duration::from_secs(3));
        assert!(settings.detect_runtimes);
    }
}
