//! Profile registry for devplan.
//!
//! The registry loads every profile definition once, validates it, and then
//! serves lookups, searches, and installation plans. Sources:
//! - Built-in profiles (embedded in the binary)
//! - Local profile directories (`profile_dirs` in config)
//!
//! A local profile with the same id as a built-in one replaces it. Loading is
//! all or nothing: any malformed document fails the whole load with a
//! [`DevplanError::Schema`] listing every offending field.
//!
//! # Example
//!
//! ```
//! use devplan::registry::Registry;
//!
//! let registry = Registry::load_all().unwrap();
//! let profile = registry.get("web-nextjs").unwrap();
//! assert_eq!(profile.id, "web-nextjs");
//! ```

pub mod builtin;
pub mod loader;
pub mod local;
pub mod search;

pub use search::{Search, SearchIter};

use std::collections::HashMap;

use crate::config::DevplanConfig;
use crate::error::{DevplanError, Result};
use crate::plan::{InstallationPlan, PlanPolicy, Planner};
use crate::profile::{Category, Profile};
use crate::system::SystemInfo;

/// One raw profile or manifest document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Where the document came from.
    pub origin: String,
    /// Raw YAML text.
    pub content: String,
    /// Category directory the document was found in, for embedded documents.
    pub category_dir: Option<String>,
}

/// Loaded, validated profiles.
///
/// Immutable after construction and safe to share between threads.
#[derive(Debug, Clone)]
pub struct Registry {
    profiles: HashMap<String, Profile>,
    order: Vec<String>,
    manifest_version: u32,
    digest: String,
    planner: Planner,
}

impl Registry {
    /// Load the built-in profiles.
    pub fn load_all() -> Result<Self> {
        Self::from_loaded(loader::load(&[])?, PlanPolicy::default())
    }

    /// Load built-in profiles plus the configured local directories.
    pub fn load(config: &DevplanConfig) -> Result<Self> {
        let policy = PlanPolicy {
            disk_aggregation: config.planning.disk_aggregation,
        };
        Self::from_loaded(loader::load(&config.profile_dirs)?, policy)
    }

    /// Build a registry from in-memory profiles, in the given order.
    ///
    /// Ids must be unique and each profile must satisfy the same invariants
    /// as a manifest document.
    pub fn from_profiles(profiles: Vec<Profile>) -> Result<Self> {
        Self::from_loaded(loader::from_profiles(profiles)?, PlanPolicy::default())
    }

    fn from_loaded(loaded: loader::Loaded, policy: PlanPolicy) -> Result<Self> {
        tracing::debug!(
            "Loaded {} profiles (manifest v{})",
            loaded.profiles.len(),
            loaded.manifest_version
        );
        Ok(Self {
            profiles: loaded.profiles,
            order: loaded.order,
            manifest_version: loaded.manifest_version,
            digest: loaded.digest,
            planner: Planner::new(policy),
        })
    }

    /// Replace the planning policy.
    pub fn with_policy(mut self, policy: PlanPolicy) -> Self {
        self.planner = Planner::new(policy);
        self
    }

    /// Look up a profile by id.
    pub fn get(&self, id: &str) -> Result<&Profile> {
        self.profiles
            .get(id)
            .ok_or_else(|| DevplanError::ProfileNotFound {
                id: id.to_string(),
                suggestions: self.suggestions(id),
            })
    }

    /// Check if a profile exists.
    pub fn has(&self, id: &str) -> bool {
        self.profiles.contains_key(id)
    }

    /// All profiles in display order.
    pub fn list(&self) -> Vec<&Profile> {
        self.order
            .iter()
            .filter_map(|id| self.profiles.get(id))
            .collect()
    }

    /// Profiles of one category, in display order.
    pub fn list_category(&self, category: Category) -> Vec<&Profile> {
        self.list()
            .into_iter()
            .filter(|p| p.category == category)
            .collect()
    }

    /// Profiles whose id, name, description, category, or tags contain
    /// `query`, ignoring case. An empty query matches everything.
    pub fn search(&self, query: &str) -> Search<'_> {
        Search::new(self, query)
    }

    /// Number of loaded profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Version declared by the manifest index.
    pub fn manifest_version(&self) -> u32 {
        self.manifest_version
    }

    /// SHA-256 over every loaded document, hex encoded.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn policy(&self) -> PlanPolicy {
        self.planner.policy()
    }

    /// Validate, resolve, and build the plan for the requested profiles.
    pub fn get_installation_plan<S: AsRef<str>>(
        &self,
        profile_ids: &[S],
        system: &SystemInfo,
    ) -> Result<InstallationPlan> {
        self.planner.plan(self, profile_ids, system)
    }

    /// Close matches for an unknown id, best first.
    fn suggestions(&self, id: &str) -> Vec<String> {
        let needle = id.to_lowercase();
        let mut scored: Vec<(usize, &String)> = self
            .order
            .iter()
            .filter_map(|candidate| {
                let distance = edit_distance(&needle, candidate);
                let close = distance <= 3.max(needle.len() / 3);
                let contains = needle.len() >= 3 && candidate.contains(needle.as_str());
                (close || contains).then_some((distance, candidate))
            })
            .collect();
        scored.sort();
        scored.into_iter().take(3).map(|(_, id)| id.clone()).collect()
    }
}

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(prev[j + 1] + 1).min(current[j] + 1);
        }
        prev = current;
    }

    prev[b.len()]
}
