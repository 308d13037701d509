//! Installable components.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::profile::version::Version;
use crate::system::PackageManager;

/// Who installs a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Installed through a package manager.
    Manager(PackageManager),
    /// Installed by the vendor's own installer.
    Installer,
}

impl Provider {
    /// The package manager, if this provider is one.
    pub fn package_manager(&self) -> Option<PackageManager> {
        match self {
            Provider::Manager(pm) => Some(*pm),
            Provider::Installer => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Manager(pm) => write!(f, "{}", pm),
            Provider::Installer => f.write_str("installer"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("installer") {
            return Ok(Provider::Installer);
        }
        s.parse::<PackageManager>()
            .map(Provider::Manager)
            .map_err(|_| format!("unknown provider '{}'", s))
    }
}

impl Serialize for Provider {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single installable unit declared by a profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// Identifier, unique within the declaring profile.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Declared version.
    pub version: Version,
    /// Who installs it.
    pub provider: Provider,
    /// Package name handed to the provider.
    pub package: String,
    /// Estimated size on disk in MB.
    pub size_mb: u64,
    /// Estimated install time in minutes.
    pub install_minutes: u32,
    /// Components that must be installed first.
    pub depends_on: BTreeSet<String>,
    /// Components that cannot be installed alongside this one.
    pub conflicts_with: BTreeSet<String>,
    /// Commands the executor runs after installing.
    pub post_install_checks: Vec<String>,
}

impl Component {
    /// Create a component with defaults for everything but id and version.
    ///
    /// Mostly useful for building fake profile sets.
    pub fn new(id: impl Into<String>, version: &str) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            package: id.clone(),
            id,
            version: Version::parse(version),
            provider: Provider::Installer,
            size_mb: 0,
            install_minutes: 0,
            depends_on: BTreeSet::new(),
            conflicts_with: BTreeSet::new(),
            post_install_checks: Vec::new(),
        }
    }

    /// Set the provider.
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Set size and time estimates.
    pub fn with_estimates(mut self, size_mb: u64, install_minutes: u32) -> Self {
        self.size_mb = size_mb;
        self.install_minutes = install_minutes;
        self
    }

    /// Add a dependency.
    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.depends_on.insert(id.into());
        self
    }

    /// Add a conflict.
    pub fn conflicts_with(mut self, id: impl Into<String>) -> Self {
        self.conflicts_with.insert(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_installer_and_managers() {
        assert_eq!("installer".parse::<Provider>(), Ok(Provider::Installer));
        assert_eq!(
            "npm".parse::<Provider>(),
            Ok(Provider::Manager(PackageManager::Npm))
        );
        assert!("curl".parse::<Provider>().is_err());
    }

    #[test]
    fn provider_exposes_package_manager() {
        assert_eq!(
            Provider::Manager(PackageManager::Pip).package_manager(),
            Some(PackageManager::Pip)
        );
        assert_eq!(Provider::Installer.package_manager(), None);
    }

    #[test]
    fn builder_sets_relations() {
        let c = Component::new("next", "14.1")
            .depends_on("nodejs-18")
            .conflicts_with("next-13")
            .with_estimates(120, 2);
        assert!(c.depends_on.contains("nodejs-18"));
        assert!(c.conflicts_with.contains("next-13"));
        assert_eq!(c.package, "next");
        assert_eq!(c.size_mb, 120);
    }

    #[test]
    fn serializes_provider_and_version_as_strings() {
        let c = Component::new("node", "20.11")
            .with_provider(Provider::Manager(PackageManager::Homebrew));
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["provider"], "brew");
        assert_eq!(json["version"], "20.11");
    }
}
