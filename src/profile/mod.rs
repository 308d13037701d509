//! Profile and component data model.
//!
//! Profiles are tagged data records: a [`Category`] enum instead of a type
//! per category. Everything here is immutable once the
//! [`Registry`](crate::registry::Registry) has loaded it; the registry only
//! hands out shared references.
//!
//! - [`component`] - Installable units and their providers
//! - [`requirement`] - Resource floors and OS families
//! - [`schema`] - Field-level validation of manifest documents
//! - [`json_schema`] - JSON Schema of the manifest contract
//! - [`version`] - Ordered version strings

pub mod component;
pub mod json_schema;
pub mod requirement;
pub mod schema;
pub mod version;

pub use component::{Component, Provider};
pub use json_schema::ManifestSchema;
pub use requirement::{OsFamily, ResourceRequirement};
pub use schema::{check_profile, parse_manifest_index, parse_profile, ManifestIndex};
pub use version::Version;

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// What kind of development stack a profile describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Web,
    Backend,
    Mobile,
    MachineLearning,
    DataScience,
    Devops,
    Systems,
    Game,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 8] = [
        Category::Web,
        Category::Backend,
        Category::Mobile,
        Category::MachineLearning,
        Category::DataScience,
        Category::Devops,
        Category::Systems,
        Category::Game,
    ];

    /// Manifest spelling of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Web => "web",
            Category::Backend => "backend",
            Category::Mobile => "mobile",
            Category::MachineLearning => "ml",
            Category::DataScience => "data",
            Category::Devops => "devops",
            Category::Systems => "systems",
            Category::Game => "game",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Web => "Web",
            Category::Backend => "Backend",
            Category::Mobile => "Mobile",
            Category::MachineLearning => "Machine Learning",
            Category::DataScience => "Data Science",
            Category::Devops => "DevOps",
            Category::Systems => "Systems",
            Category::Game => "Game Development",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == lowered)
            .ok_or_else(|| {
                let valid: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown category '{}' (expected one of: {})", s, valid.join(", "))
            })
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A check the user (or executor) runs once the profile is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationStep {
    pub name: String,
    pub command: String,
}

/// Starter project metadata shipped with a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleProject {
    pub name: String,
    pub description: String,
    pub entrypoint: Option<String>,
}

/// A declarative bundle describing a development stack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    /// Unique profile id (e.g., `web-nextjs`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Stack category.
    pub category: Category,
    /// Profile definition version.
    pub version: String,
    /// Components in declaration order.
    pub components: Vec<Component>,
    /// Machine requirements.
    pub requirements: ResourceRequirement,
    /// Post-install verification.
    pub verification: Vec<VerificationStep>,
    /// Optional starter project.
    pub sample_project: Option<SampleProject>,
    /// Free-form search tags.
    pub tags: Vec<String>,
}

impl Profile {
    /// Create an empty profile. Mostly useful for building fake profile sets.
    pub fn new(id: impl Into<String>, category: Category) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            description: String::new(),
            id,
            category,
            version: "1.0.0".to_string(),
            components: Vec::new(),
            requirements: ResourceRequirement::none(),
            verification: Vec::new(),
            sample_project: None,
            tags: Vec::new(),
        }
    }

    /// Append a component.
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// Replace the resource requirement.
    pub fn with_requirements(mut self, requirements: ResourceRequirement) -> Self {
        self.requirements = requirements;
        self
    }

    /// Look up a component by id.
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Sum of component size estimates in MB.
    pub fn total_size_mb(&self) -> u64 {
        self.components.iter().map(|c| c.size_mb).sum()
    }

    /// Sum of component install time estimates in minutes.
    pub fn total_install_minutes(&self) -> u32 {
        self.components.iter().map(|c| c.install_minutes).sum()
    }

    /// Case-insensitive match on id, name, description, category, or tags.
    ///
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.id.to_lowercase().contains(needle)
            || self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.category.as_str().contains(needle)
            || self.category.label().to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}
