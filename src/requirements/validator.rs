//! Checks a system snapshot against a resource requirement.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::profile::{OsFamily, ResourceRequirement};
use crate::system::SystemInfo;

/// A requirement field that can be violated or left unverified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementField {
    RamGb,
    DiskGb,
    CpuCores,
    Gpu,
    Os,
}

impl RequirementField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementField::RamGb => "ram_gb",
            RequirementField::DiskGb => "disk_gb",
            RequirementField::CpuCores => "cpu_cores",
            RequirementField::Gpu => "gpu",
            RequirementField::Os => "os",
        }
    }
}

impl fmt::Display for RequirementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A required or actual value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Measure {
    Gb(f64),
    Cores(u32),
    Flag(bool),
    Os(OsFamily),
    OsSet(BTreeSet<OsFamily>),
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Gb(gb) => write!(f, "{} GB", format_gb(*gb)),
            Measure::Cores(n) => write!(f, "{} cores", n),
            Measure::Flag(true) => f.write_str("yes"),
            Measure::Flag(false) => f.write_str("no"),
            Measure::Os(os) => write!(f, "{}", os),
            Measure::OsSet(set) if set.is_empty() => f.write_str("none"),
            Measure::OsSet(set) => {
                let names: Vec<&str> = set.iter().map(|os| os.as_str()).collect();
                f.write_str(&names.join(", "))
            }
        }
    }
}

/// Trim a trailing `.0` and round to one decimal.
pub fn format_gb(gb: f64) -> String {
    let rounded = (gb * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

/// A requirement the machine does not meet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub field: RequirementField,
    pub required: Measure,
    pub actual: Measure,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            RequirementField::Gpu => f.write_str("gpu: a GPU is required but none was found"),
            RequirementField::Os => write!(
                f,
                "os: supports {} but this machine runs {}",
                self.required, self.actual
            ),
            _ => write!(
                f,
                "{}: requires {}, found {}",
                self.field, self.required, self.actual
            ),
        }
    }
}

/// Outcome of checking one requirement against one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// True when nothing was violated. Unverified fields don't count.
    pub satisfied: bool,
    pub violations: Vec<Violation>,
    /// Fields whose system value was unknown.
    pub unverified: Vec<RequirementField>,
}

/// How disk floors combine across profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskAggregation {
    /// Profiles install side by side, so their disk needs add up.
    #[default]
    Sum,
    /// Only the largest single floor counts.
    Max,
}

impl fmt::Display for DiskAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiskAggregation::Sum => f.write_str("sum"),
            DiskAggregation::Max => f.write_str("max"),
        }
    }
}

impl FromStr for DiskAggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(DiskAggregation::Sum),
            "max" => Ok(DiskAggregation::Max),
            _ => Err(format!("unknown disk aggregation '{}' (expected sum or max)", s)),
        }
    }
}

/// Check `system` against `requirement`.
///
/// A field whose system value is unknown lands in `unverified` and is never
/// a violation. Floors of zero need no system value at all.
pub fn validate(system: &SystemInfo, requirement: &ResourceRequirement) -> ValidationResult {
    let mut violations = Vec::new();
    let mut unverified = Vec::new();

    check_gb(
        RequirementField::RamGb,
        requirement.min_ram_gb,
        system.ram_gb,
        &mut violations,
        &mut unverified,
    );
    check_gb(
        RequirementField::DiskGb,
        requirement.min_disk_gb,
        system.disk_free_gb,
        &mut violations,
        &mut unverified,
    );

    if requirement.min_cpu_cores > 0 {
        match system.cpu_cores {
            None => unverified.push(RequirementField::CpuCores),
            Some(cores) if cores < requirement.min_cpu_cores => violations.push(Violation {
                field: RequirementField::CpuCores,
                required: Measure::Cores(requirement.min_cpu_cores),
                actual: Measure::Cores(cores),
            }),
            Some(_) => {}
        }
    }

    if requirement.gpu_required {
        match system.gpu_present {
            None => unverified.push(RequirementField::Gpu),
            Some(false) => violations.push(Violation {
                field: RequirementField::Gpu,
                required: Measure::Flag(true),
                actual: Measure::Flag(false),
            }),
            Some(true) => {}
        }
    }

    if !requirement.supports(system.os) {
        violations.push(Violation {
            field: RequirementField::Os,
            required: Measure::OsSet(requirement.os_support.clone()),
            actual: Measure::Os(system.os),
        });
    }

    for violation in &violations {
        tracing::debug!("Requirement not met: {}", violation);
    }

    ValidationResult {
        satisfied: violations.is_empty(),
        violations,
        unverified,
    }
}

fn check_gb(
    field: RequirementField,
    required: f64,
    actual: Option<f64>,
    violations: &mut Vec<Violation>,
    unverified: &mut Vec<RequirementField>,
) {
    if required <= 0.0 {
        return;
    }
    match actual {
        None => unverified.push(field),
        Some(actual) if actual < required => violations.push(Violation {
            field,
            required: Measure::Gb(required),
            actual: Measure::Gb(actual),
        }),
        Some(_) => {}
    }
}

/// Combine the requirements of several profiles into one.
///
/// RAM and CPU floors take the maximum, disk follows `disk`, GPU is required
/// if any profile requires it, and supported OS families are intersected.
pub fn aggregate<'a>(
    requirements: impl IntoIterator<Item = &'a ResourceRequirement>,
    disk: DiskAggregation,
) -> ResourceRequirement {
    requirements
        .into_iter()
        .fold(ResourceRequirement::none(), |acc, req| ResourceRequirement {
            min_ram_gb: acc.min_ram_gb.max(req.min_ram_gb),
            min_disk_gb: match disk {
                DiskAggregation::Sum => acc.min_disk_gb + req.min_disk_gb,
                DiskAggregation::Max => acc.min_disk_gb.max(req.min_disk_gb),
            },
            min_cpu_cores: acc.min_cpu_cores.max(req.min_cpu_cores),
            gpu_required: acc.gpu_required || req.gpu_required,
            os_support: acc
                .os_support
                .intersection(&req.os_support)
                .copied()
                .collect(),
        })
}
