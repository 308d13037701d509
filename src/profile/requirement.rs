//! Resource requirement floors declared by profiles.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating system families a profile can support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Linux,
    Macos,
    Windows,
}

impl OsFamily {
    /// All families, in display order.
    pub const ALL: [OsFamily; 3] = [OsFamily::Linux, OsFamily::Macos, OsFamily::Windows];

    /// Family of the compile target, if it is one we know.
    pub fn current() -> Option<Self> {
        Self::from_target_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a family.
    pub fn from_target_os(os: &str) -> Option<Self> {
        match os {
            "linux" => Some(OsFamily::Linux),
            "macos" => Some(OsFamily::Macos),
            "windows" => Some(OsFamily::Windows),
            _ => None,
        }
    }

    /// Manifest spelling of the family.
    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Linux => "linux",
            OsFamily::Macos => "macos",
            OsFamily::Windows => "windows",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OsFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(OsFamily::Linux),
            "macos" | "darwin" | "osx" => Ok(OsFamily::Macos),
            "windows" => Ok(OsFamily::Windows),
            _ => Err(format!(
                "unknown operating system '{}' (expected linux, macos, or windows)",
                s
            )),
        }
    }
}

/// Minimum machine resources a profile needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceRequirement {
    /// Minimum total RAM in GB.
    pub min_ram_gb: f64,
    /// Minimum free disk on the install volume in GB.
    pub min_disk_gb: f64,
    /// Minimum CPU core count.
    pub min_cpu_cores: u32,
    /// Whether a GPU must be present.
    pub gpu_required: bool,
    /// Operating systems the profile supports.
    pub os_support: BTreeSet<OsFamily>,
}

impl ResourceRequirement {
    /// A requirement every machine satisfies.
    pub fn none() -> Self {
        Self {
            min_ram_gb: 0.0,
            min_disk_gb: 0.0,
            min_cpu_cores: 0,
            gpu_required: false,
            os_support: OsFamily::ALL.into_iter().collect(),
        }
    }

    pub fn with_ram_gb(mut self, gb: f64) -> Self {
        self.min_ram_gb = gb;
        self
    }

    pub fn with_disk_gb(mut self, gb: f64) -> Self {
        self.min_disk_gb = gb;
        self
    }

    pub fn with_cpu_cores(mut self, cores: u32) -> Self {
        self.min_cpu_cores = cores;
        self
    }

    pub fn with_gpu(mut self, required: bool) -> Self {
        self.gpu_required = required;
        self
    }

    /// Restrict to the given OS families.
    pub fn with_os(mut self, families: impl IntoIterator<Item = OsFamily>) -> Self {
        self.os_support = families.into_iter().collect();
        self
    }

    /// Check whether the given OS family is supported.
    pub fn supports(&self, os: OsFamily) -> bool {
        self.os_support.contains(&os)
    }
}

impl Default for ResourceRequirement {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_family_parses_aliases() {
        assert_eq!("darwin".parse::<OsFamily>(), Ok(OsFamily::Macos));
        assert_eq!("Linux".parse::<OsFamily>(), Ok(OsFamily::Linux));
        assert!("beos".parse::<OsFamily>().is_err());
    }

    #[test]
    fn os_family_from_target_os() {
        assert_eq!(OsFamily::from_target_os("windows"), Some(OsFamily::Windows));
        assert_eq!(OsFamily::from_target_os("freebsd"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn current_family_on_linux() {
        assert_eq!(OsFamily::current(), Some(OsFamily::Linux));
    }

    #[test]
    fn none_supports_every_family() {
        let req = ResourceRequirement::none();
        for os in OsFamily::ALL {
            assert!(req.supports(os));
        }
        assert!(!req.gpu_required);
    }
}
