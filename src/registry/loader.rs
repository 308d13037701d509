//! Turns raw documents into a validated profile set.
//!
//! Every document is checked before anything is returned, and all
//! violations across all documents are reported together.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde_yaml::Value;
use sha2::{Digest, Sha256};

use super::{builtin, local, Document};
use crate::error::{DevplanError, Result, SchemaViolation};
use crate::profile::{check_profile, parse_manifest_index, parse_profile, Profile};

/// Output of a successful load.
#[derive(Debug)]
pub struct Loaded {
    pub profiles: HashMap<String, Profile>,
    pub order: Vec<String>,
    pub manifest_version: u32,
    pub digest: String,
}

/// Load the embedded profiles and any local directories.
pub fn load(local_dirs: &[PathBuf]) -> Result<Loaded> {
    let manifest = builtin::manifest_document()?;
    let builtin_docs = builtin::profile_documents()?;
    let local_docs = local::profile_documents(local_dirs)?;

    let digest = digest_documents(
        std::iter::once(&manifest)
            .chain(&builtin_docs)
            .chain(&local_docs),
    );

    let mut violations = Vec::new();

    let index = parse_yaml(&manifest, &mut violations).and_then(|doc| {
        parse_manifest_index(&manifest.origin, &doc)
            .map_err(|v| violations.extend(v))
            .ok()
    });

    let builtin = parse_documents(&builtin_docs, &mut violations);
    let local = parse_documents(&local_docs, &mut violations);

    let mut profiles: HashMap<String, Profile> = HashMap::new();
    let mut origins: HashMap<String, String> = HashMap::new();
    let mut builtin_ids = Vec::new();

    for (origin, profile) in builtin {
        if let Some(first) = origins.get(&profile.id) {
            violations.push(duplicate_id(&origin, &profile.id, first));
            continue;
        }
        builtin_ids.push(profile.id.clone());
        origins.insert(profile.id.clone(), origin);
        profiles.insert(profile.id.clone(), profile);
    }

    let mut local_ids: HashMap<String, String> = HashMap::new();
    let mut local_only = Vec::new();
    for (origin, profile) in local {
        if let Some(first) = local_ids.get(&profile.id) {
            violations.push(duplicate_id(&origin, &profile.id, first));
            continue;
        }
        if let Some(builtin_origin) = origins.get(&profile.id) {
            tracing::warn!(
                "Local profile '{}' from {} overrides the built-in one from {}",
                profile.id,
                origin,
                builtin_origin
            );
        } else {
            local_only.push(profile.id.clone());
        }
        local_ids.insert(profile.id.clone(), origin);
        profiles.insert(profile.id.clone(), profile);
    }

    let order = match &index {
        Some(index) => display_order(
            &manifest.origin,
            &index.order,
            &builtin_ids,
            local_only,
            &mut violations,
        ),
        None => Vec::new(),
    };

    if !violations.is_empty() {
        return Err(DevplanError::Schema { violations });
    }

    let manifest_version = index.map(|i| i.version).unwrap_or(1);
    Ok(Loaded {
        profiles,
        order,
        manifest_version,
        digest,
    })
}

/// Validate in-memory profiles and keep their order.
pub fn from_profiles(profiles: Vec<Profile>) -> Result<Loaded> {
    let mut violations = Vec::new();
    let mut map = HashMap::new();
    let mut order = Vec::new();

    let digest = {
        let mut hasher = Sha256::new();
        for profile in &profiles {
            let encoded = serde_json::to_string(profile).map_err(anyhow::Error::from)?;
            hasher.update(encoded.as_bytes());
        }
        hex::encode(hasher.finalize())
    };

    for (i, profile) in profiles.into_iter().enumerate() {
        let origin = format!("profiles[{}]", i);
        violations.extend(check_profile(&origin, &profile));
        if map.contains_key(&profile.id) {
            violations.push(SchemaViolation {
                origin,
                profile: Some(profile.id.clone()),
                field: "id".to_string(),
                message: format!("duplicate profile id '{}'", profile.id),
            });
            continue;
        }
        order.push(profile.id.clone());
        map.insert(profile.id.clone(), profile);
    }

    if !violations.is_empty() {
        return Err(DevplanError::Schema { violations });
    }

    Ok(Loaded {
        profiles: map,
        order,
        manifest_version: 1,
        digest,
    })
}

fn parse_yaml(doc: &Document, violations: &mut Vec<SchemaViolation>) -> Option<Value> {
    match serde_yaml::from_str::<Value>(&doc.content) {
        Ok(value) => Some(value),
        Err(e) => {
            violations.push(SchemaViolation {
                origin: doc.origin.clone(),
                profile: None,
                field: "<document>".to_string(),
                message: format!("invalid YAML: {}", e),
            });
            None
        }
    }
}

/// Parse profile documents, keeping the valid ones with their origin.
pub fn parse_documents(
    docs: &[Document],
    violations: &mut Vec<SchemaViolation>,
) -> Vec<(String, Profile)> {
    let mut profiles = Vec::new();

    for doc in docs {
        let Some(value) = parse_yaml(doc, violations) else {
            continue;
        };
        match parse_profile(&doc.origin, &value) {
            Ok(profile) => {
                if let Some(dir) = &doc.category_dir {
                    if profile.category.as_str() != dir {
                        violations.push(SchemaViolation {
                            origin: doc.origin.clone(),
                            profile: Some(profile.id.clone()),
                            field: "category".to_string(),
                            message: format!(
                                "category '{}' does not match directory '{}'",
                                profile.category, dir
                            ),
                        });
                        continue;
                    }
                }
                profiles.push((doc.origin.clone(), profile));
            }
            Err(found) => violations.extend(found),
        }
    }

    profiles
}

/// Manifest order first, then unlisted built-ins by id, then local-only ids.
fn display_order(
    manifest_origin: &str,
    listed: &[String],
    builtin_ids: &[String],
    mut local_only: Vec<String>,
    violations: &mut Vec<SchemaViolation>,
) -> Vec<String> {
    let known: HashSet<&str> = builtin_ids.iter().map(|s| s.as_str()).collect();
    let mut seen = HashSet::new();
    let mut order = Vec::new();

    for (i, id) in listed.iter().enumerate() {
        if !known.contains(id.as_str()) {
            violations.push(SchemaViolation {
                origin: manifest_origin.to_string(),
                profile: None,
                field: format!("order[{}]", i),
                message: format!("unknown profile '{}'", id),
            });
        } else if !seen.insert(id.as_str()) {
            violations.push(SchemaViolation {
                origin: manifest_origin.to_string(),
                profile: None,
                field: format!("order[{}]", i),
                message: format!("'{}' is listed more than once", id),
            });
        } else {
            order.push(id.clone());
        }
    }

    let mut unlisted: Vec<String> = builtin_ids
        .iter()
        .filter(|id| !seen.contains(id.as_str()))
        .cloned()
        .collect();
    unlisted.sort();
    order.extend(unlisted);

    local_only.sort();
    order.extend(local_only);
    order
}

fn duplicate_id(origin: &str, id: &str, first: &str) -> SchemaViolation {
    SchemaViolation {
        origin: origin.to_string(),
        profile: Some(id.to_string()),
        field: "id".to_string(),
        message: format!("duplicate profile id '{}' (first declared in {})", id, first),
    }
}

fn digest_documents<'a>(docs: impl Iterator<Item = &'a Document>) -> String {
    let mut hasher = Sha256::new();
    for doc in docs {
        hasher.update(doc.origin.as_bytes());
        hasher.update([0u8]);
        hasher.update(doc.content.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Category, Component};
    use std::fs;
    use tempfile::TempDir;

    fn doc(origin: &str, category_dir: Option<&str>, content: &str) -> Document {
        Document {
            origin: origin.to_string(),
            content: content.to_string(),
            category_dir: category_dir.map(String::from),
        }
    }

    const RUST_PROFILE: &str = r#"
id: systems-rust
name: Rust Systems
category: systems
version: "1.0"
requirements: { min_ram_gb: 4, min_disk_gb: 3, min_cpu_cores: 2, os: [linux, macos, windows] }
components:
  - { id: rustup, name: rustup, version: "1.27", provider: installer, size_mb: 20, install_minutes: 1 }
"#;

    #[test]
    fn builtin_load_succeeds_and_orders_by_manifest() {
        let loaded = load(&[]).unwrap();
        assert!(loaded.profiles.contains_key("web-nextjs"));
        assert_eq!(loaded.order.len(), loaded.profiles.len());
        assert_eq!(loaded.order.first().map(String::as_str), Some("web-nextjs"));
    }

    #[test]
    fn parse_documents_reports_every_bad_document() {
        let docs = vec![
            doc("a.yml", None, "id: [oops"),
            doc("b.yml", None, "id: b\nname: B\n"),
            doc("c.yml", Some("systems"), RUST_PROFILE),
        ];
        let mut violations = Vec::new();
        let profiles = parse_documents(&docs, &mut violations);

        assert_eq!(profiles.len(), 1);
        assert!(violations.iter().any(|v| v.origin == "a.yml"));
        assert!(violations.iter().any(|v| v.origin == "b.yml"));
        assert!(violations.iter().all(|v| v.origin != "c.yml"));
    }

    #[test]
    fn category_must_match_directory() {
        let docs = vec![doc("web/x.yml", Some("web"), RUST_PROFILE)];
        let mut violations = Vec::new();
        assert!(parse_documents(&docs, &mut violations).is_empty());
        assert_eq!(violations[0].field, "category");
    }

    #[test]
    fn local_profile_overrides_builtin() {
        let temp = TempDir::new().unwrap();
        let content = r#"
id: web-nextjs
name: Team Next.js
category: web
version: "9.0"
requirements: { min_ram_gb: 2, min_disk_gb: 1, min_cpu_cores: 1, os: [linux] }
components:
  - { id: node, name: Node, version: "20.11", provider: installer, size_mb: 80, install_minutes: 2 }
"#;
        fs::write(temp.path().join("nextjs.yml"), content).unwrap();

        let loaded = load(&[temp.path().to_path_buf()]).unwrap();
        assert_eq!(loaded.profiles["web-nextjs"].name, "Team Next.js");
        assert_eq!(
            loaded.order.iter().filter(|id| *id == "web-nextjs").count(),
            1
        );
    }

    #[test]
    fn local_only_profiles_follow_builtins() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("rust.yml"), RUST_PROFILE.replace("systems-rust", "zz-team-rust"))
            .unwrap();

        let loaded = load(&[temp.path().to_path_buf()]).unwrap();
        assert_eq!(loaded.order.last().map(String::as_str), Some("zz-team-rust"));
    }

    #[test]
    fn malformed_local_profile_fails_whole_load() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("bad.yml"), "id: bad\nbogus: 1\n").unwrap();

        let err = load(&[temp.path().to_path_buf()]).unwrap_err();
        match err {
            DevplanError::Schema { violations } => {
                assert!(violations.iter().any(|v| v.field == "bogus"));
                assert!(violations.iter().any(|v| v.field == "name"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn display_order_flags_unknown_and_repeated_ids() {
        let mut violations = Vec::new();
        let order = display_order(
            "manifest.yml",
            &["b".to_string(), "ghost".to_string(), "b".to_string()],
            &["a".to_string(), "b".to_string()],
            vec![],
            &mut violations,
        );
        assert_eq!(order, vec!["b", "a"]);
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["order[1]", "order[2]"]);
    }

    #[test]
    fn from_profiles_rejects_duplicate_ids() {
        let p = Profile::new("dup", Category::Web).with_component(Component::new("x", "1"));
        let err = from_profiles(vec![p.clone(), p]).unwrap_err();
        match err {
            DevplanError::Schema { violations } => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].origin, "profiles[1]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn digest_changes_with_content() {
        let a = digest_documents([doc("x", None, "1")].iter());
        let b = digest_documents([doc("x", None, "2")].iter());
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }
}
