//! Planning lifecycle.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Where a planning request is in its lifecycle.
///
/// `Validating -> Resolving -> Building -> Ready`, or `Rejected` from
/// `Validating` or `Resolving`. `Ready` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStage {
    Validating,
    Resolving,
    Building,
    Ready,
    Rejected,
}

/// An attempt to move between stages out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal plan stage transition: {from} -> {to}")]
pub struct IllegalTransition {
    pub from: PlanStage,
    pub to: PlanStage,
}

impl PlanStage {
    /// Whether `self -> next` is a legal transition.
    pub fn can_advance_to(self, next: PlanStage) -> bool {
        use PlanStage::*;
        matches!(
            (self, next),
            (Validating, Resolving)
                | (Resolving, Building)
                | (Building, Ready)
                | (Validating, Rejected)
                | (Resolving, Rejected)
        )
    }

    /// Move to `next`, or fail if the transition is illegal.
    pub fn advance(self, next: PlanStage) -> Result<PlanStage, IllegalTransition> {
        if self.can_advance_to(next) {
            tracing::debug!("Plan stage: {} -> {}", self, next);
            Ok(next)
        } else {
            Err(IllegalTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PlanStage::Ready | PlanStage::Rejected)
    }
}

impl fmt::Display for PlanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlanStage::Validating => "validating",
            PlanStage::Resolving => "resolving",
            PlanStage::Building => "building",
            PlanStage::Ready => "ready",
            PlanStage::Rejected => "rejected",
        };
        f.write_str(name)
    }
}
