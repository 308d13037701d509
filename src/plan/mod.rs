//! Installation plans.
//!
//! A plan is the answer to "what would it take to set up these profiles on
//! this machine": the ordered install steps, their estimated cost, and how
//! the machine measures up against the combined requirements.

mod builder;
pub mod stage;

pub use builder::{PlanPolicy, Planner};
pub use stage::{IllegalTransition, PlanStage};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::profile::{Component, ResourceRequirement};
use crate::requirements::{DiskAggregation, RequirementField, Violation};
use crate::resolver::VersionOverride;

/// One component to install, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanStep {
    /// 1-based position in the install order.
    pub position: usize,
    pub component: Component,
    /// Profile whose declaration of the component was kept.
    pub profile_id: String,
    pub profile_name: String,
    /// Every requested profile declaring the component.
    pub declared_by: Vec<String>,
    /// Whether the provider is on this machine; `None` when it couldn't be checked.
    pub provider_available: Option<bool>,
    /// Version already installed, for components that map to a detected runtime.
    pub installed_version: Option<String>,
}

/// A post-install check contributed by a requested profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanVerification {
    pub profile_id: String,
    pub name: String,
    pub command: String,
}

/// The ordered install steps for a set of profiles on one machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstallationPlan {
    /// Requested profiles, deduplicated, in request order.
    pub profile_ids: Vec<String>,
    pub steps: Vec<PlanStep>,
    pub total_size_mb: u64,
    pub total_install_minutes: u32,
    /// Combined requirement of the requested profiles.
    pub requirement: ResourceRequirement,
    pub disk_aggregation: DiskAggregation,
    pub satisfied: bool,
    pub violations: Vec<Violation>,
    pub unverified: Vec<RequirementField>,
    /// Components declared at different versions by different profiles.
    pub warnings: Vec<VersionOverride>,
    pub verification: Vec<PlanVerification>,
    pub manifest_version: u32,
    /// SHA-256 of the profile documents the plan was built from.
    pub manifest_digest: String,
    pub created_at: DateTime<Utc>,
}

impl InstallationPlan {
    /// Find the step installing `component_id`.
    pub fn step(&self, component_id: &str) -> Option<&PlanStep> {
        self.steps.iter().find(|s| s.component.id == component_id)
    }

    /// Component ids in install order.
    pub fn component_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.component.id.as_str()).collect()
    }

    /// Steps whose provider is known to be missing.
    pub fn missing_providers(&self) -> impl Iterator<Item = &PlanStep> {
        self.steps
            .iter()
            .filter(|s| s.provider_available == Some(false))
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
