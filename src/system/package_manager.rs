//! Package manager detection.
//!
//! Managers are detected by looking for their binary on PATH. The binary is
//! never executed: some managers (notably `brew` and `conda`) take seconds to
//! start, and presence is all the planner needs.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Known package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PackageManager {
    // System
    Homebrew,
    Apt,
    Dnf,
    Yum,
    Pacman,
    Chocolatey,
    Scoop,
    Winget,

    // Language
    Pip,
    Pipx,
    Conda,
    Npm,
    Pnpm,
    Yarn,
    Cargo,
    Rustup,
    Gem,
    Go,
}

/// Broad grouping of managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerKind {
    /// Installs OS-level packages.
    System,
    /// Installs packages for one language ecosystem.
    Language,
}

impl PackageManager {
    /// Every known manager, in detection order.
    pub const ALL: [PackageManager; 18] = [
        PackageManager::Homebrew,
        PackageManager::Apt,
        PackageManager::Dnf,
        PackageManager::Yum,
        PackageManager::Pacman,
        PackageManager::Chocolatey,
        PackageManager::Scoop,
        PackageManager::Winget,
        PackageManager::Pip,
        PackageManager::Pipx,
        PackageManager::Conda,
        PackageManager::Npm,
        PackageManager::Pnpm,
        PackageManager::Yarn,
        PackageManager::Cargo,
        PackageManager::Rustup,
        PackageManager::Gem,
        PackageManager::Go,
    ];

    /// Manifest spelling of the manager.
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManager::Homebrew => "brew",
            PackageManager::Apt => "apt",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Pacman => "pacman",
            PackageManager::Chocolatey => "choco",
            PackageManager::Scoop => "scoop",
            PackageManager::Winget => "winget",
            PackageManager::Pip => "pip",
            PackageManager::Pipx => "pipx",
            PackageManager::Conda => "conda",
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Cargo => "cargo",
            PackageManager::Rustup => "rustup",
            PackageManager::Gem => "gem",
            PackageManager::Go => "go",
        }
    }

    /// Binary names that indicate the manager is installed, in preference order.
    pub fn binaries(&self) -> &'static [&'static str] {
        match self {
            PackageManager::Homebrew => &["brew"],
            PackageManager::Apt => &["apt-get", "apt"],
            PackageManager::Dnf => &["dnf"],
            PackageManager::Yum => &["yum"],
            PackageManager::Pacman => &["pacman"],
            PackageManager::Chocolatey => &["choco"],
            PackageManager::Scoop => &["scoop"],
            PackageManager::Winget => &["winget"],
            PackageManager::Pip => &["pip3", "pip"],
            PackageManager::Pipx => &["pipx"],
            PackageManager::Conda => &["conda", "mamba"],
            PackageManager::Npm => &["npm"],
            PackageManager::Pnpm => &["pnpm"],
            PackageManager::Yarn => &["yarn"],
            PackageManager::Cargo => &["cargo"],
            PackageManager::Rustup => &["rustup"],
            PackageManager::Gem => &["gem"],
            PackageManager::Go => &["go"],
        }
    }

    /// Which group this manager belongs to.
    pub fn kind(&self) -> ManagerKind {
        match self {
            PackageManager::Homebrew
            | PackageManager::Apt
            | PackageManager::Dnf
            | PackageManager::Yum
            | PackageManager::Pacman
            | PackageManager::Chocolatey
            | PackageManager::Scoop
            | PackageManager::Winget => ManagerKind::System,
            _ => ManagerKind::Language,
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        let name = match lowered.as_str() {
            "homebrew" => "brew",
            "apt-get" => "apt",
            "chocolatey" => "choco",
            "pip3" => "pip",
            other => other,
        };
        PackageManager::ALL
            .into_iter()
            .find(|pm| pm.as_str() == name)
            .ok_or_else(|| format!("unknown package manager '{}'", s))
    }
}

impl Serialize for PackageManager {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that exists and is executable. On Windows the
/// usual executable extensions are tried as well.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    let names: Vec<String> = if cfg!(windows) {
        ["", ".exe", ".cmd", ".bat", ".ps1"]
            .iter()
            .map(|ext| format!("{}{}", tool, ext))
            .collect()
    } else {
        vec![tool.to_string()]
    };

    for dir in path_entries {
        for name in &names {
            let candidate = dir.join(name);
            if candidate.is_file() && is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Detect which package managers have a binary on the given PATH.
pub fn detect_package_managers(path_entries: &[PathBuf]) -> BTreeSet<PackageManager> {
    PackageManager::ALL
        .into_iter()
        .filter(|pm| {
            pm.binaries()
                .iter()
                .any(|bin| resolve_tool_path(bin, path_entries).is_some())
        })
        .collect()
}
