//! Field-level validation of profile manifest documents.
//!
//! Documents are parsed into a generic YAML value first and then walked
//! field by field, so a single pass reports every offending field instead
//! of stopping at the first serde error.

use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::error::SchemaViolation;
use crate::profile::component::{Component, Provider};
use crate::profile::requirement::{OsFamily, ResourceRequirement};
use crate::profile::version::Version;
use crate::profile::{Category, Profile, SampleProject, VerificationStep};

const PROFILE_KEYS: &[&str] = &[
    "id",
    "name",
    "description",
    "category",
    "version",
    "requirements",
    "components",
    "verification",
    "sample_project",
    "tags",
];
const REQUIREMENT_KEYS: &[&str] = &[
    "min_ram_gb",
    "min_disk_gb",
    "min_cpu_cores",
    "gpu_required",
    "os",
];
const COMPONENT_KEYS: &[&str] = &[
    "id",
    "name",
    "version",
    "provider",
    "package",
    "size_mb",
    "install_minutes",
    "depends_on",
    "conflicts_with",
    "post_install_checks",
];
const VERIFICATION_KEYS: &[&str] = &["name", "command"];
const SAMPLE_PROJECT_KEYS: &[&str] = &["name", "description", "entrypoint"];
const INDEX_KEYS: &[&str] = &["version", "order"];

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9._-]*$").expect("valid id regex"))
}

/// Parsed `manifest.yml`: the manifest version and display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestIndex {
    /// Declared manifest version.
    pub version: u32,
    /// Preferred display order of profile ids.
    pub order: Vec<String>,
}

/// Collects violations while walking one document.
struct DocReader<'a> {
    origin: &'a str,
    profile: Option<String>,
    violations: Vec<SchemaViolation>,
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

impl<'a> DocReader<'a> {
    fn new(origin: &'a str) -> Self {
        Self {
            origin,
            profile: None,
            violations: Vec::new(),
        }
    }

    fn violation(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(SchemaViolation {
            origin: self.origin.to_string(),
            profile: self.profile.clone(),
            field: field.into(),
            message: message.into(),
        });
    }

    /// Expect a mapping and flag keys outside `allowed`.
    fn mapping<'v>(&mut self, value: &'v Value, path: &str, allowed: &[&str]) -> Option<&'v Mapping> {
        let Some(map) = value.as_mapping() else {
            let field = if path.is_empty() { "<document>" } else { path };
            self.violation(field, "expected a mapping");
            return None;
        };

        for key in map.keys() {
            match key.as_str() {
                Some(k) if allowed.contains(&k) => {}
                Some(k) => self.violation(join(path, k), "unknown field"),
                None => self.violation(path.to_string(), "field names must be strings"),
            }
        }

        Some(map)
    }

    fn required_str(&mut self, map: &Mapping, path: &str, key: &str) -> Option<String> {
        match map.get(key) {
            None | Some(Value::Null) => {
                self.violation(join(path, key), "missing required field");
                None
            }
            Some(value) => self.string_value(value, &join(path, key)),
        }
    }

    /// Versions must be strings: YAML reads `3.10` as the float `3.1`.
    fn required_version(&mut self, map: &Mapping, path: &str) -> Option<String> {
        match map.get("version") {
            Some(Value::Number(n)) => {
                self.violation(
                    join(path, "version"),
                    format!("quote the version (\"{}\" is read as a number)", n),
                );
                None
            }
            _ => self.required_str(map, path, "version"),
        }
    }

    fn optional_str(&mut self, map: &Mapping, path: &str, key: &str) -> Option<String> {
        match map.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => self.string_value(value, &join(path, key)),
        }
    }

    fn string_value(&mut self, value: &Value, field: &str) -> Option<String> {
        match value {
            Value::String(s) if s.trim().is_empty() => {
                self.violation(field, "must not be empty");
                None
            }
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => {
                self.violation(field, "expected a string");
                None
            }
        }
    }

    fn id_value(&mut self, map: &Mapping, path: &str) -> Option<String> {
        let id = self.required_str(map, path, "id")?;
        if id_pattern().is_match(&id) {
            Some(id)
        } else {
            self.violation(
                join(path, "id"),
                format!(
                    "'{}' is not a valid id (lowercase letters, digits, '.', '_' and '-')",
                    id
                ),
            );
            None
        }
    }

    fn required_u64(&mut self, map: &Mapping, path: &str, key: &str) -> Option<u64> {
        match map.get(key) {
            None | Some(Value::Null) => {
                self.violation(join(path, key), "missing required field");
                None
            }
            Some(value) => match value.as_u64() {
                Some(n) => Some(n),
                None => {
                    self.violation(join(path, key), "expected a non-negative integer");
                    None
                }
            },
        }
    }

    fn required_u32(&mut self, map: &Mapping, path: &str, key: &str) -> Option<u32> {
        let n = self.required_u64(map, path, key)?;
        match u32::try_from(n) {
            Ok(n) => Some(n),
            Err(_) => {
                self.violation(join(path, key), "value is too large");
                None
            }
        }
    }

    fn required_gb(&mut self, map: &Mapping, path: &str, key: &str) -> Option<f64> {
        match map.get(key) {
            None | Some(Value::Null) => {
                self.violation(join(path, key), "missing required field");
                None
            }
            Some(value) => match value.as_f64() {
                Some(n) if n.is_finite() && n >= 0.0 => Some(n),
                _ => {
                    self.violation(join(path, key), "expected a non-negative number of GB");
                    None
                }
            },
        }
    }

    fn optional_bool(&mut self, map: &Mapping, path: &str, key: &str) -> Option<bool> {
        match map.get(key) {
            None | Some(Value::Null) => Some(false),
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                self.violation(join(path, key), "expected true or false");
                None
            }
        }
    }

    /// Optional list of strings; absent means empty.
    fn string_list(&mut self, map: &Mapping, path: &str, key: &str) -> Vec<String> {
        let field = join(path, key);
        match map.get(key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| self.string_value(item, &format!("{}[{}]", field, i)))
                .collect(),
            Some(_) => {
                self.violation(field, "expected a list of strings");
                Vec::new()
            }
        }
    }

    fn sequence<'v>(&mut self, map: &'v Mapping, path: &str, key: &str, required: bool) -> Option<&'v [Value]> {
        match map.get(key) {
            None | Some(Value::Null) => {
                if required {
                    self.violation(join(path, key), "missing required field");
                }
                None
            }
            Some(Value::Sequence(items)) => Some(items.as_slice()),
            Some(_) => {
                self.violation(join(path, key), "expected a list");
                None
            }
        }
    }

    fn requirements(&mut self, map: &Mapping) -> Option<ResourceRequirement> {
        let Some(value) = map.get("requirements") else {
            self.violation("requirements", "missing required field");
            return None;
        };
        let req = self.mapping(value, "requirements", REQUIREMENT_KEYS)?;

        let min_ram_gb = self.required_gb(req, "requirements", "min_ram_gb");
        let min_disk_gb = self.required_gb(req, "requirements", "min_disk_gb");
        let min_cpu_cores = self.required_u32(req, "requirements", "min_cpu_cores");
        let gpu_required = self.optional_bool(req, "requirements", "gpu_required");

        let os_names = self.string_list(req, "requirements", "os");
        let mut os_support = BTreeSet::new();
        for (i, name) in os_names.iter().enumerate() {
            match name.parse::<OsFamily>() {
                Ok(os) => {
                    os_support.insert(os);
                }
                Err(e) => self.violation(format!("requirements.os[{}]", i), e),
            }
        }
        if os_names.is_empty() {
            self.violation("requirements.os", "must list at least one operating system");
        }

        Some(ResourceRequirement {
            min_ram_gb: min_ram_gb?,
            min_disk_gb: min_disk_gb?,
            min_cpu_cores: min_cpu_cores?,
            gpu_required: gpu_required?,
            os_support,
        })
    }

    fn component(&mut self, value: &Value, path: &str) -> Option<Component> {
        let map = self.mapping(value, path, COMPONENT_KEYS)?;

        let id = self.id_value(map, path);
        let name = self.required_str(map, path, "name");
        let version = self.required_version(map, path);
        let provider = self
            .required_str(map, path, "provider")
            .and_then(|raw| match raw.parse::<Provider>() {
                Ok(p) => Some(p),
                Err(e) => {
                    self.violation(join(path, "provider"), e);
                    None
                }
            });
        let package = self.optional_str(map, path, "package");
        let size_mb = self.required_u64(map, path, "size_mb");
        let install_minutes = self.required_u32(map, path, "install_minutes");
        let depends_on = self.string_list(map, path, "depends_on");
        let conflicts_with = self.string_list(map, path, "conflicts_with");
        let post_install_checks = self.string_list(map, path, "post_install_checks");

        let id = id?;
        Some(Component {
            package: package.unwrap_or_else(|| id.clone()),
            name: name?,
            version: Version::parse(&version?),
            provider: provider?,
            size_mb: size_mb?,
            install_minutes: install_minutes?,
            depends_on: depends_on.into_iter().collect(),
            conflicts_with: conflicts_with.into_iter().collect(),
            post_install_checks,
            id,
        })
    }

    fn components(&mut self, map: &Mapping) -> Vec<Component> {
        let Some(items) = self.sequence(map, "", "components", true) else {
            return Vec::new();
        };
        if items.is_empty() {
            self.violation("components", "must declare at least one component");
        }

        let mut components = Vec::new();
        let mut seen = HashSet::new();
        for (i, item) in items.iter().enumerate() {
            let path = format!("components[{}]", i);
            if let Some(component) = self.component(item, &path) {
                if !seen.insert(component.id.clone()) {
                    self.violation(
                        join(&path, "id"),
                        format!("duplicate component id '{}'", component.id),
                    );
                    continue;
                }
                components.push(component);
            }
        }

        self.check_relations(&components);
        components
    }

    /// Dependencies must stay inside the profile; conflicts must point outside it.
    fn check_relations(&mut self, components: &[Component]) {
        let ids: HashSet<&str> = components.iter().map(|c| c.id.as_str()).collect();

        for (i, component) in components.iter().enumerate() {
            for dep in &component.depends_on {
                if dep == &component.id {
                    self.violation(
                        format!("components[{}].depends_on", i),
                        format!("'{}' depends on itself", dep),
                    );
                } else if !ids.contains(dep.as_str()) {
                    self.violation(
                        format!("components[{}].depends_on", i),
                        format!("'{}' is not a component of this profile", dep),
                    );
                }
            }
            for other in &component.conflicts_with {
                if other == &component.id || ids.contains(other.as_str()) {
                    self.violation(
                        format!("components[{}].conflicts_with", i),
                        format!("'{}' is declared by the same profile", other),
                    );
                }
            }
        }
    }

    fn verification(&mut self, map: &Mapping) -> Vec<VerificationStep> {
        let Some(items) = self.sequence(map, "", "verification", false) else {
            return Vec::new();
        };

        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let path = format!("verification[{}]", i);
                let step = self.mapping(item, &path, VERIFICATION_KEYS)?;
                let name = self.required_str(step, &path, "name");
                let command = self.required_str(step, &path, "command");
                Some(VerificationStep {
                    name: name?,
                    command: command?,
                })
            })
            .collect()
    }

    fn sample_project(&mut self, map: &Mapping) -> Option<SampleProject> {
        let value = map.get("sample_project").filter(|v| !v.is_null())?;
        let project = self.mapping(value, "sample_project", SAMPLE_PROJECT_KEYS)?;
        let name = self.required_str(project, "sample_project", "name");
        let description = self.required_str(project, "sample_project", "description");
        let entrypoint = self.optional_str(project, "sample_project", "entrypoint");
        Some(SampleProject {
            name: name?,
            description: description?,
            entrypoint,
        })
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, Vec<SchemaViolation>> {
        match value {
            Some(v) if self.violations.is_empty() => Ok(v),
            _ => Err(self.violations),
        }
    }
}

/// Validate one profile document and build the [`Profile`].
///
/// Returns every violation found in the document when it is malformed.
pub fn parse_profile(origin: &str, doc: &Value) -> Result<Profile, Vec<SchemaViolation>> {
    let mut reader = DocReader::new(origin);

    let Some(map) = reader.mapping(doc, "", PROFILE_KEYS) else {
        return Err(reader.violations);
    };

    let id = reader.id_value(map, "");
    reader.profile = id.clone();

    let name = reader.required_str(map, "", "name");
    let description = reader.optional_str(map, "", "description");
    let category = reader
        .required_str(map, "", "category")
        .and_then(|raw| match raw.parse::<Category>() {
            Ok(c) => Some(c),
            Err(e) => {
                reader.violation("category", e);
                None
            }
        });
    let version = reader.required_version(map, "");
    let requirements = reader.requirements(map);
    let components = reader.components(map);
    let verification = reader.verification(map);
    let sample_project = reader.sample_project(map);
    let tags = reader.string_list(map, "", "tags");

    let profile = (|| {
        Some(Profile {
            id: id?,
            name: name?,
            description: description.unwrap_or_default(),
            category: category?,
            version: version?,
            components,
            requirements: requirements?,
            verification,
            sample_project,
            tags,
        })
    })();

    reader.finish(profile)
}

/// Check an in-memory profile against the invariants enforced on documents.
pub fn check_profile(origin: &str, profile: &Profile) -> Vec<SchemaViolation> {
    let mut reader = DocReader::new(origin);
    reader.profile = Some(profile.id.clone());

    if !id_pattern().is_match(&profile.id) {
        reader.violation("id", format!("'{}' is not a valid id", profile.id));
    }
    if profile.components.is_empty() {
        reader.violation("components", "must declare at least one component");
    }

    let mut seen = HashSet::new();
    for (i, component) in profile.components.iter().enumerate() {
        if !seen.insert(component.id.as_str()) {
            reader.violation(
                format!("components[{}].id", i),
                format!("duplicate component id '{}'", component.id),
            );
        }
    }
    reader.check_relations(&profile.components);

    reader.violations
}

/// Validate the manifest index document.
pub fn parse_manifest_index(origin: &str, doc: &Value) -> Result<ManifestIndex, Vec<SchemaViolation>> {
    let mut reader = DocReader::new(origin);

    let Some(map) = reader.mapping(doc, "", INDEX_KEYS) else {
        return Err(reader.violations);
    };

    let version = reader
        .required_u32(map, "", "version")
        .and_then(|v| {
            if v == 0 {
                reader.violation("version", "must be at least 1");
                None
            } else {
                Some(v)
            }
        });
    let order = reader.string_list(map, "", "order");

    let index = version.map(|version| ManifestIndex { version, order });
    reader.finish(index)
}
