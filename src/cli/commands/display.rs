//! Text rendering shared by the commands.
//!
//! Functions here build lines instead of printing so they can be tested with
//! a plain theme.

use crate::plan::InstallationPlan;
use crate::profile::{OsFamily, Profile, ResourceRequirement};
use crate::requirements::{format_gb, Measure, RequirementField};
use crate::system::{ManagerKind, SystemInfo};
use crate::ui::{format_minutes, format_size_mb, DevplanTheme, Table};

const UNKNOWN: &str = "unknown";

fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| UNKNOWN.to_string())
}

/// Key-value summary of a snapshot.
pub fn system_lines(theme: &DevplanTheme, info: &SystemInfo) -> Vec<String> {
    let os = match (&info.os_name, &info.os_version) {
        (Some(name), Some(version)) => format!("{} ({} {})", info.os, name, version),
        (Some(name), None) => format!("{} ({})", info.os, name),
        _ => info.os.to_string(),
    };
    let ram = info.ram_gb.map(|total| match info.available_ram_gb {
        Some(available) => format!(
            "{} GB ({} GB available)",
            format_gb(total),
            format_gb(available)
        ),
        None => format!("{} GB", format_gb(total)),
    });
    let gpu = info
        .gpu_present
        .map(|present| if present { "present" } else { "none" }.to_string());
    let managers = |kind: ManagerKind| {
        info.package_managers.as_ref().map(|set| {
            let names: Vec<&str> = set
                .iter()
                .filter(|pm| pm.kind() == kind)
                .map(|pm| pm.as_str())
                .collect();
            if names.is_empty() {
                "none".to_string()
            } else {
                names.join(", ")
            }
        })
    };

    let mut lines = vec![
        theme.format_field("OS", &os),
        theme.format_field("Architecture", &or_unknown(info.arch.clone())),
        theme.format_field("CPU cores", &or_unknown(info.cpu_cores.map(|c| c.to_string()))),
        theme.format_field("RAM", &or_unknown(ram)),
        theme.format_field(
            "Disk free",
            &or_unknown(info.disk_free_gb.map(|gb| format!("{} GB", format_gb(gb)))),
        ),
        theme.format_field("GPU", &or_unknown(gpu)),
        theme.format_field("System packages", &or_unknown(managers(ManagerKind::System))),
        theme.format_field("Language packages", &or_unknown(managers(ManagerKind::Language))),
    ];

    if let Some(runtimes) = &info.installed_runtimes {
        let listed = if runtimes.is_empty() {
            "none".to_string()
        } else {
            runtimes
                .iter()
                .map(|(name, version)| format!("{} {}", name, version))
                .collect::<Vec<_>>()
                .join(", ")
        };
        lines.push(theme.format_field("Runtimes", &listed));
    }

    lines
}

/// The required value of `field`, or `None` when the requirement is trivial.
fn required_measure(requirement: &ResourceRequirement, field: RequirementField) -> Option<Measure> {
    match field {
        RequirementField::RamGb => {
            (requirement.min_ram_gb > 0.0).then_some(Measure::Gb(requirement.min_ram_gb))
        }
        RequirementField::DiskGb => {
            (requirement.min_disk_gb > 0.0).then_some(Measure::Gb(requirement.min_disk_gb))
        }
        RequirementField::CpuCores => {
            (requirement.min_cpu_cores > 0).then_some(Measure::Cores(requirement.min_cpu_cores))
        }
        RequirementField::Gpu => requirement.gpu_required.then_some(Measure::Flag(true)),
        RequirementField::Os => (requirement.os_support.len() < OsFamily::ALL.len())
            .then(|| Measure::OsSet(requirement.os_support.clone())),
    }
}

const FIELDS: [RequirementField; 5] = [
    RequirementField::RamGb,
    RequirementField::DiskGb,
    RequirementField::CpuCores,
    RequirementField::Gpu,
    RequirementField::Os,
];

/// One line per non-trivial requirement: met, violated, or unverified.
pub fn requirement_lines(theme: &DevplanTheme, plan: &InstallationPlan) -> Vec<String> {
    FIELDS
        .iter()
        .filter_map(|field| {
            if let Some(violation) = plan.violations.iter().find(|v| v.field == *field) {
                return Some(theme.format_error(&violation.to_string()));
            }
            let required = required_measure(&plan.requirement, *field)?;
            if plan.unverified.contains(field) {
                Some(theme.format_unknown(&format!(
                    "{}: requires {}, could not be checked",
                    field, required
                )))
            } else {
                Some(theme.format_success(&format!("{}: requires {}", field, required)))
            }
        })
        .collect()
}

/// Install steps as a table.
pub fn steps_table(theme: &DevplanTheme, plan: &InstallationPlan, verbose: bool) -> Table {
    let mut headers = vec!["#", "Component", "Version", "Provider", "Profile", "Size", "Time"];
    if verbose {
        headers.push("Installed");
    }
    let mut table = Table::new(headers).align_right(0).align_right(5).align_right(6);

    for step in &plan.steps {
        let provider = match step.provider_available {
            Some(false) => theme
                .warning
                .apply_to(format!("{} (missing)", step.component.provider))
                .to_string(),
            _ => step.component.provider.to_string(),
        };
        let mut row = vec![
            step.position.to_string(),
            theme.id.apply_to(&step.component.id).to_string(),
            step.component.version.to_string(),
            provider,
            step.profile_id.clone(),
            format_size_mb(step.component.size_mb),
            format_minutes(step.component.install_minutes),
        ];
        if verbose {
            row.push(step.installed_version.clone().unwrap_or_else(|| "-".to_string()));
        }
        table.add_row(&row[..]);
    }

    table
}

/// `12 steps, 4.2 GB, 1 h 5 min`
pub fn plan_totals(plan: &InstallationPlan) -> String {
    format!(
        "{} step{}, {}, {}",
        plan.steps.len(),
        if plan.steps.len() == 1 { "" } else { "s" },
        format_size_mb(plan.total_size_mb),
        format_minutes(plan.total_install_minutes)
    )
}

/// Profiles as a table.
pub fn profiles_table(profiles: &[&Profile]) -> Table {
    let mut table = Table::new(vec!["Id", "Name", "Category", "Components", "Size"])
        .align_right(3)
        .align_right(4);
    for profile in profiles {
        table.add_row(&[
            profile.id.clone(),
            profile.name.clone(),
            profile.category.label().to_string(),
            profile.components.len().to_string(),
            format_size_mb(profile.total_size_mb()),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Planner;
    use crate::profile::{Category, Component};
    use crate::registry::Registry;
    use crate::system::PackageManager;

    fn theme() -> DevplanTheme {
        DevplanTheme::plain()
    }

    #[test]
    fn unknown_system_values_render_as_unknown() {
        let lines = system_lines(&theme(), &SystemInfo::new(OsFamily::Linux));
        assert_eq!(lines[0], "OS: linux");
        assert!(lines.contains(&"RAM: unknown".to_string()));
        assert!(lines.contains(&"GPU: unknown".to_string()));
        assert!(lines.contains(&"System packages: unknown".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("Runtimes")));
    }

    #[test]
    fn empty_manager_group_renders_none() {
        let info = SystemInfo::new(OsFamily::Linux).with_package_managers([PackageManager::Apt]);
        let lines = system_lines(&theme(), &info);
        assert!(lines.contains(&"System packages: apt".to_string()));
        assert!(lines.contains(&"Language packages: none".to_string()));
    }

    #[test]
    fn known_system_values_render() {
        let mut info = SystemInfo::new(OsFamily::Macos)
            .with_ram_gb(16.0)
            .with_cpu_cores(10)
            .with_gpu(true)
            .with_package_managers([PackageManager::Homebrew, PackageManager::Npm, PackageManager::Pip]);
        info.available_ram_gb = Some(9.5);
        info.installed_runtimes = Some(Default::default());

        let lines = system_lines(&theme(), &info);
        assert!(lines.contains(&"RAM: 16 GB (9.5 GB available)".to_string()));
        assert!(lines.contains(&"CPU cores: 10".to_string()));
        assert!(lines.contains(&"GPU: present".to_string()));
        assert!(lines.contains(&"System packages: brew".to_string()));
        assert!(lines.contains(&"Language packages: pip, npm".to_string()));
        assert!(lines.contains(&"Runtimes: none".to_string()));
    }

    fn plan_for(system: &SystemInfo) -> InstallationPlan {
        let registry = Registry::from_profiles(vec![Profile::new("ml", Category::MachineLearning)
            .with_requirements(
                ResourceRequirement::none()
                    .with_ram_gb(16.0)
                    .with_disk_gb(10.0)
                    .with_cpu_cores(4),
            )
            .with_component(Component::new("python", "3.11").with_estimates(100, 3))])
        .unwrap();
        Planner::default().plan(&registry, &["ml"], system).unwrap()
    }

    #[test]
    fn requirement_lines_mark_each_outcome() {
        let system = SystemInfo::new(OsFamily::Linux)
            .with_ram_gb(8.0)
            .with_disk_free_gb(50.0);
        let lines = requirement_lines(&theme(), &plan_for(&system));

        assert_eq!(
            lines,
            vec![
                "✗ ram_gb: requires 16 GB, found 8 GB",
                "✓ disk_gb: requires 10 GB",
                "? cpu_cores: requires 4 cores, could not be checked",
            ]
        );
    }

    #[test]
    fn totals_pluralize() {
        let system = SystemInfo::new(OsFamily::Linux);
        assert_eq!(plan_totals(&plan_for(&system)), "1 step, 100 MB, 3 min");
    }

    #[test]
    fn steps_table_has_a_row_per_step() {
        let plan = plan_for(&SystemInfo::new(OsFamily::Linux));
        let table = steps_table(&theme(), &plan, true);
        assert_eq!(table.row_count(), 1);
        assert!(table.render().contains("Installed"));
    }
}
