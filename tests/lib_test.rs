//! Library integration tests.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use devplan::config::DevplanConfig;
use devplan::profile::{parse_profile, Category, Component, OsFamily, Profile, ResourceRequirement};
use devplan::registry::{builtin, Registry};
use devplan::requirements::{aggregate, validate, DiskAggregation, Measure, RequirementField};
use devplan::system::{FakeProbe, ProbeError, ProbeKind, SystemInfo, SystemProfiler};
use devplan::DevplanError;
use tempfile::TempDir;

fn machine(ram_gb: f64) -> SystemInfo {
    SystemProfiler::new(FakeProbe::new(OsFamily::Linux).with_ram_gb(ram_gb))
        .profile()
        .unwrap()
}

fn component_ids(registry: &Registry, ids: &[&str], system: &SystemInfo) -> String {
    registry
        .get_installation_plan(ids, system)
        .unwrap()
        .component_ids()
        .join(" ")
}

fn write_profile(dir: &Path, file: &str, content: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(file), content).unwrap();
}

#[test]
fn every_loaded_profile_round_trips_through_get() {
    let registry = Registry::load_all().unwrap();
    let documents = builtin::profile_documents().unwrap();
    assert_eq!(documents.len(), registry.len());

    for document in &documents {
        let yaml: serde_yaml::Value = serde_yaml::from_str(&document.content).unwrap();
        let parsed = parse_profile(&document.origin, &yaml).unwrap();
        assert_eq!(registry.get(&parsed.id).unwrap(), &parsed, "{}", document.origin);
    }
}

#[test]
fn builtin_display_order_follows_manifest() {
    let registry = Registry::load_all().unwrap();
    let ids: Vec<&str> = registry.list().iter().map(|p| p.id.as_str()).collect();
    insta::assert_snapshot!(
        ids.join(" "),
        @"web-nextjs web-django backend-go ml-python data-jupyter mobile-flutter devops-cloud systems-rust game-godot"
    );
    assert_eq!(registry.len(), ids.len());
}

#[test]
fn single_profile_plan_orders_dependencies_first() {
    let registry = Registry::load_all().unwrap();
    insta::assert_snapshot!(
        component_ids(&registry, &["web-nextjs"], &machine(32.0)),
        @"git nodejs-18 pnpm nextjs vscode"
    );
}

#[test]
fn plans_are_idempotent() {
    let registry = Registry::load_all().unwrap();
    let system = machine(32.0);
    let ids = ["devops-cloud", "systems-rust", "backend-go"];

    let first = component_ids(&registry, &ids, &system);
    for _ in 0..5 {
        assert_eq!(component_ids(&registry, &ids, &system), first);
    }
}

#[test]
fn small_machine_gets_full_plan_with_ram_violation() {
    let registry = Registry::load_all().unwrap();
    let plan = registry
        .get_installation_plan(&["web-nextjs", "ml-python"], &machine(8.0))
        .unwrap();

    insta::assert_snapshot!(
        plan.component_ids().join(" "),
        @"git nodejs-18 pnpm nextjs vscode python-3.11 jupyterlab numpy pytorch"
    );
    assert!(!plan.satisfied);
    assert_eq!(plan.violations.len(), 1);
    assert_eq!(plan.violations[0].field, RequirementField::RamGb);
    assert_eq!(plan.violations[0].required, Measure::Gb(16.0));
    assert_eq!(plan.violations[0].actual, Measure::Gb(8.0));

    // git is declared at 2.43 and 2.44
    assert_eq!(plan.warnings.len(), 1);
    assert_eq!(plan.step("git").unwrap().component.version.as_str(), "2.44");
    assert_eq!(plan.step("git").unwrap().declared_by, vec!["web-nextjs", "ml-python"]);
}

#[test]
fn totals_are_serial_sums() {
    let registry = Registry::load_all().unwrap();
    let plan = registry
        .get_installation_plan(&["systems-rust"], &machine(16.0))
        .unwrap();
    let profile = registry.get("systems-rust").unwrap();

    assert_eq!(plan.total_size_mb, profile.total_size_mb());
    assert_eq!(plan.total_install_minutes, profile.total_install_minutes());
    assert_eq!(plan.verification.len(), profile.verification.len());
    assert_eq!(plan.manifest_digest, registry.digest());
}

#[test]
fn differing_versions_collapse_to_highest() {
    let registry = Registry::from_profiles(vec![
        Profile::new("web-a", Category::Web).with_component(Component::new("nodejs-18", "18.18")),
        Profile::new("web-b", Category::Web).with_component(Component::new("nodejs-18", "18.19")),
    ])
    .unwrap();

    let plan = registry
        .get_installation_plan(&["web-a", "web-b"], &machine(16.0))
        .unwrap();

    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.steps[0].component.version.as_str(), "18.19");
    assert_eq!(plan.steps[0].profile_id, "web-b");
    assert_eq!(plan.warnings.len(), 1);
    assert_eq!(
        plan.warnings[0].to_string(),
        "nodejs-18: using 18.19 from 'web-b' instead of 18.18 from 'web-a'"
    );
}

#[test]
fn dependency_cycle_names_both_components() {
    let registry = Registry::from_profiles(vec![Profile::new("loop", Category::Systems)
        .with_component(Component::new("a", "1").depends_on("b"))
        .with_component(Component::new("b", "1").depends_on("a"))])
    .unwrap();

    match registry.get_installation_plan(&["loop"], &machine(16.0)) {
        Err(DevplanError::CyclicDependency { cycle }) => {
            assert_eq!(cycle, vec!["a", "b", "a"]);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn declared_conflict_rejects_the_request() {
    let registry = Registry::load_all().unwrap();
    match registry.get_installation_plan(&["web-django", "data-jupyter"], &machine(16.0)) {
        Err(DevplanError::Conflict {
            component,
            conflicts_with,
            profile,
        }) => {
            assert_eq!(component, "miniconda");
            assert_eq!(conflicts_with, "pyenv");
            assert_eq!(profile, "data-jupyter");
        }
        other => panic!("expected a conflict, got {other:?}"),
    }
}

#[test]
fn unknown_profile_suggests_close_ids() {
    let registry = Registry::load_all().unwrap();
    match registry.get_installation_plan(&["web-nextjs", "ml-pyton"], &machine(16.0)) {
        Err(DevplanError::ProfileNotFound { id, suggestions }) => {
            assert_eq!(id, "ml-pyton");
            assert_eq!(suggestions.first().map(String::as_str), Some("ml-python"));
        }
        other => panic!("expected ProfileNotFound, got {other:?}"),
    }
}

#[test]
fn ram_shortfall_is_a_single_violation() {
    let requirement = ResourceRequirement::none().with_ram_gb(8.0);
    let result = validate(&SystemInfo::new(OsFamily::Linux).with_ram_gb(4.0), &requirement);

    assert!(!result.satisfied);
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].field, RequirementField::RamGb);
    assert_eq!(result.violations[0].required, Measure::Gb(8.0));
    assert_eq!(result.violations[0].actual, Measure::Gb(4.0));
}

#[test]
fn disk_adds_up_and_ram_takes_the_max() {
    let a = ResourceRequirement::none().with_disk_gb(5.0).with_ram_gb(8.0);
    let b = ResourceRequirement::none().with_disk_gb(10.0).with_ram_gb(4.0);

    let combined = aggregate([&a, &b], DiskAggregation::Sum);
    assert!(combined.min_disk_gb >= 15.0);
    assert_eq!(combined.min_ram_gb, 8.0);

    let largest = aggregate([&a, &b], DiskAggregation::Max);
    assert_eq!(largest.min_disk_gb, 10.0);
}

#[test]
fn unknown_system_values_are_unverified() {
    let registry = Registry::load_all().unwrap();
    let plan = registry
        .get_installation_plan(&["game-godot"], &SystemInfo::new(OsFamily::Windows))
        .unwrap();

    assert!(plan.satisfied);
    assert!(plan.violations.is_empty());
    assert_eq!(
        plan.unverified,
        vec![
            RequirementField::RamGb,
            RequirementField::DiskGb,
            RequirementField::CpuCores,
            RequirementField::Gpu,
        ]
    );
}

#[test]
fn hanging_probe_times_out_without_stalling_others() {
    let probe = FakeProbe::new(OsFamily::Macos)
        .with_ram_gb(32.0)
        .hanging(ProbeKind::Gpu, Duration::from_secs(10));
    let started = Instant::now();
    let info = SystemProfiler::new(probe)
        .with_timeout(Duration::from_millis(200))
        .profile()
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(info.ram_gb, Some(32.0));
    assert_eq!(info.gpu_present, None);
    assert!(matches!(
        info.probe_failures.as_slice(),
        [ProbeError::Timeout {
            probe: ProbeKind::Gpu,
            ..
        }]
    ));
}

#[test]
fn search_can_be_walked_twice() {
    let registry = Registry::load_all().unwrap();
    let search = registry.search("PYTHON");

    let first: Vec<&str> = search.iter().map(|p| p.id.as_str()).collect();
    let second: Vec<&str> = search.iter().map(|p| p.id.as_str()).collect();
    assert!(first.contains(&"ml-python"));
    assert_eq!(first, second);
}

#[test]
fn local_profiles_extend_and_override_builtins() {
    let temp = TempDir::new().unwrap();
    write_profile(
        temp.path(),
        "zig.yml",
        r#"
id: systems-zig
name: Zig
category: systems
version: "0.1"
requirements:
  min_ram_gb: 2
  min_disk_gb: 1
  min_cpu_cores: 1
  os: [linux, macos]
components:
  - id: zig
    name: Zig
    version: "0.11"
    provider: installer
    size_mb: 80
    install_minutes: 1
"#,
    );
    write_profile(
        temp.path(),
        "go.yml",
        r#"
id: backend-go
name: Go (pinned)
category: backend
version: "9.9"
requirements:
  min_ram_gb: 2
  min_disk_gb: 1
  min_cpu_cores: 1
  os: [linux]
components:
  - id: go
    name: Go
    version: "1.21"
    provider: installer
    size_mb: 200
    install_minutes: 2
"#,
    );

    let config = DevplanConfig {
        profile_dirs: vec![temp.path().to_path_buf()],
        ..Default::default()
    };
    let registry = Registry::load(&config).unwrap();

    assert_eq!(registry.get("backend-go").unwrap().name, "Go (pinned)");
    assert!(registry.has("systems-zig"));
    assert_eq!(registry.list().last().unwrap().id, "systems-zig");
}

#[test]
fn schema_errors_from_every_document_are_reported_together() {
    let temp = TempDir::new().unwrap();
    write_profile(
        temp.path(),
        "bad-one.yml",
        r#"
id: Bad_Id
name: Broken
category: web
version: "1"
requirements: { min_ram_gb: 1, min_disk_gb: 1, min_cpu_cores: 1, os: [linux] }
components:
  - id: thing
    name: Thing
    version: "1"
    provider: installer
    size_mb: 1
    install_minutes: 1
"#,
    );
    write_profile(
        temp.path(),
        "bad-two.yml",
        r#"
id: also-bad
name: Broken too
category: cooking
version: "1"
requirements: { min_ram_gb: 1, min_disk_gb: 1, min_cpu_cores: 1, os: [linux] }
components: []
"#,
    );

    let config = DevplanConfig {
        profile_dirs: vec![temp.path().to_path_buf()],
        ..Default::default()
    };
    match Registry::load(&config) {
        Err(DevplanError::Schema { violations }) => {
            let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
            assert!(fields.contains(&"id"), "{fields:?}");
            assert!(fields.contains(&"category"), "{fields:?}");
            assert!(fields.contains(&"components"), "{fields:?}");
            assert!(violations.iter().any(|v| v.origin.ends_with("bad-one.yml")));
            assert!(violations.iter().any(|v| v.origin.ends_with("bad-two.yml")));
        }
        other => panic!("expected schema errors, got {other:?}"),
    }
}

#[test]
fn plans_serialize_to_json() {
    let registry = Registry::load_all().unwrap();
    let plan = registry
        .get_installation_plan(&["backend-go"], &machine(16.0))
        .unwrap();
    let json = serde_json::to_value(&plan).unwrap();

    assert_eq!(json["profile_ids"][0], "backend-go");
    assert_eq!(json["steps"][0]["position"], 1);
    assert_eq!(json["satisfied"], true);
    assert_eq!(json["disk_aggregation"], "sum");
}
