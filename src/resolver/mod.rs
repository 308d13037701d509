//! Dependency resolution.
//!
//! Turns the requested profiles into one install order:
//!
//! 1. [`merge`] unions every component, keeping the highest version of an id
//!    declared more than once
//! 2. conflicts between any two components of the union are rejected
//! 3. [`graph`] orders the union so dependencies come first
//!
//! Steps 2 and 3 are fatal on failure; nothing is partially ordered.

pub mod graph;
pub mod merge;

pub use graph::{DependencyGraph, DependencyGraphBuilder};
pub use merge::{merge, MergedComponent, MergedSet, VersionOverride};

use crate::error::{DevplanError, Result};
use crate::profile::{Component, Profile};

/// A component placed in the install order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedComponent {
    pub component: Component,
    /// Profile whose declaration was kept.
    pub profile_id: String,
    /// Every requested profile declaring this component.
    pub declared_by: Vec<String>,
}

/// Ordered components plus non-fatal merge warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub components: Vec<ResolvedComponent>,
    pub warnings: Vec<VersionOverride>,
}

/// Resolve the install order for `profiles` (deduplicated, in request order).
pub fn resolve(profiles: &[&Profile]) -> Result<Resolution> {
    let merged = merge(profiles);
    check_conflicts(&merged)?;

    let graph = merged
        .components
        .iter()
        .fold(DependencyGraph::builder(), |builder, c| {
            builder.add_node(
                c.component.id.clone(),
                c.rank,
                c.component.depends_on.iter().cloned(),
            )
        })
        .build()?;
    let order = graph.topological_order()?;

    let MergedSet {
        components,
        warnings,
    } = merged;
    let mut by_id: std::collections::HashMap<String, MergedComponent> = components
        .into_iter()
        .map(|c| (c.component.id.clone(), c))
        .collect();

    let components = order
        .iter()
        .filter_map(|id| by_id.remove(id))
        .map(|c| ResolvedComponent {
            component: c.component,
            profile_id: c.profile_id,
            declared_by: c.declared_by,
        })
        .collect();

    Ok(Resolution {
        components,
        warnings,
    })
}

/// Reject the first pair where either side declares the other a conflict.
///
/// Components are checked in (rank, id) order so the reported pair is stable.
pub fn check_conflicts(merged: &MergedSet) -> Result<()> {
    let mut ordered: Vec<&MergedComponent> = merged.components.iter().collect();
    ordered.sort_by(|a, b| (a.rank, &a.component.id).cmp(&(b.rank, &b.component.id)));

    for candidate in ordered {
        for (other, declared_in) in &candidate.conflict_sources {
            if other != &candidate.component.id && merged.contains(other) {
                tracing::debug!(
                    "Conflict: {} (from {}) vs {}",
                    candidate.component.id,
                    declared_in,
                    other
                );
                return Err(DevplanError::Conflict {
                    component: candidate.component.id.clone(),
                    conflicts_with: other.clone(),
                    profile: declared_in.clone(),
                });
            }
        }
    }

    Ok(())
}
