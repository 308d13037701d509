//! Runs validation and resolution and assembles the plan.

use std::collections::HashSet;

use chrono::Utc;
use serde::Serialize;

use super::stage::PlanStage;
use super::{InstallationPlan, PlanStep, PlanVerification};
use crate::error::Result;
use crate::profile::{Component, Profile};
use crate::registry::Registry;
use crate::requirements::{aggregate, validate, DiskAggregation};
use crate::resolver::{resolve, ResolvedComponent};
use crate::system::runtime::known_runtimes;
use crate::system::SystemInfo;

/// Knobs that change how plans are computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanPolicy {
    pub disk_aggregation: DiskAggregation,
}

/// Builds [`InstallationPlan`]s for a registry.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    policy: PlanPolicy,
}

impl Planner {
    pub fn new(policy: PlanPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PlanPolicy {
        self.policy
    }

    /// Plan the installation of `profile_ids` on `system`.
    ///
    /// Unknown ids, conflicts, and cycles reject the request. Unmet
    /// requirements don't: the plan comes back with `satisfied = false`.
    pub fn plan<S: AsRef<str>>(
        &self,
        registry: &Registry,
        profile_ids: &[S],
        system: &SystemInfo,
    ) -> Result<InstallationPlan> {
        let mut stage = PlanStage::Validating;
        let result = self.run(&mut stage, registry, profile_ids, system);

        if let Err(err) = &result {
            tracing::debug!("Plan rejected while {}: {}", stage, err);
            if stage.can_advance_to(PlanStage::Rejected) {
                stage = stage.advance(PlanStage::Rejected).unwrap_or(stage);
            }
        }
        debug_assert!(result.is_err() || stage == PlanStage::Ready);
        result
    }

    fn run<S: AsRef<str>>(
        &self,
        stage: &mut PlanStage,
        registry: &Registry,
        profile_ids: &[S],
        system: &SystemInfo,
    ) -> Result<InstallationPlan> {
        let profiles = requested_profiles(registry, profile_ids)?;
        let requirement = aggregate(
            profiles.iter().map(|p| &p.requirements),
            self.policy.disk_aggregation,
        );
        let validation = validate(system, &requirement);

        *stage = stage.advance(PlanStage::Resolving).map_err(anyhow::Error::from)?;
        let resolution = resolve(&profiles)?;

        *stage = stage.advance(PlanStage::Building).map_err(anyhow::Error::from)?;
        let steps: Vec<PlanStep> = resolution
            .components
            .into_iter()
            .enumerate()
            .map(|(i, resolved)| build_step(i + 1, resolved, &profiles, system))
            .collect();

        let verification = profiles
            .iter()
            .flat_map(|p| {
                p.verification.iter().map(|v| PlanVerification {
                    profile_id: p.id.clone(),
                    name: v.name.clone(),
                    command: v.command.clone(),
                })
            })
            .collect();

        let plan = InstallationPlan {
            profile_ids: profiles.iter().map(|p| p.id.clone()).collect(),
            total_size_mb: steps.iter().map(|s| s.component.size_mb).sum(),
            total_install_minutes: steps.iter().map(|s| s.component.install_minutes).sum(),
            steps,
            requirement,
            disk_aggregation: self.policy.disk_aggregation,
            satisfied: validation.satisfied,
            violations: validation.violations,
            unverified: validation.unverified,
            warnings: resolution.warnings,
            verification,
            manifest_version: registry.manifest_version(),
            manifest_digest: registry.digest().to_string(),
            created_at: Utc::now(),
        };

        *stage = stage.advance(PlanStage::Ready).map_err(anyhow::Error::from)?;
        tracing::debug!(
            "Planned {} steps for {} profile(s), satisfied: {}",
            plan.steps.len(),
            plan.profile_ids.len(),
            plan.satisfied
        );
        Ok(plan)
    }
}

/// Look up requested ids, dropping repeats but keeping request order.
fn requested_profiles<'r, S: AsRef<str>>(
    registry: &'r Registry,
    profile_ids: &[S],
) -> Result<Vec<&'r Profile>> {
    let mut seen = HashSet::new();
    let mut profiles = Vec::new();
    for id in profile_ids {
        let id = id.as_ref();
        if seen.insert(id) {
            profiles.push(registry.get(id)?);
        }
    }
    Ok(profiles)
}

fn build_step(
    position: usize,
    resolved: ResolvedComponent,
    profiles: &[&Profile],
    system: &SystemInfo,
) -> PlanStep {
    let profile_name = profiles
        .iter()
        .find(|p| p.id == resolved.profile_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| resolved.profile_id.clone());

    let provider_available = match resolved.component.provider.package_manager() {
        Some(manager) => system.has_package_manager(manager),
        None => Some(true),
    };
    let installed_version = runtime_name(&resolved.component)
        .and_then(|name| system.runtime_version(name))
        .map(String::from);

    PlanStep {
        position,
        component: resolved.component,
        profile_id: resolved.profile_id,
        profile_name,
        declared_by: resolved.declared_by,
        provider_available,
        installed_version,
    }
}

/// The detected runtime a component corresponds to, matched on package or id.
fn runtime_name(component: &Component) -> Option<&'static str> {
    known_runtimes().find(|name| component.package == *name || component.id == *name)
}
