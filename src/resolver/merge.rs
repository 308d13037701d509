//! Union of the components of several profiles.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::profile::{Component, Profile};

/// A component declared at different versions by two requested profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionOverride {
    pub component: String,
    pub kept_version: String,
    pub kept_from: String,
    pub overridden_version: String,
    pub overridden_from: String,
}

impl fmt::Display for VersionOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: using {} from '{}' instead of {} from '{}'",
            self.component,
            self.kept_version,
            self.kept_from,
            self.overridden_version,
            self.overridden_from
        )
    }
}

/// One component of the union, after merging every declaration of its id.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedComponent {
    /// The kept declaration, with relations unioned across declarations.
    pub component: Component,
    /// Profile the kept declaration came from.
    pub profile_id: String,
    /// Index of the first requested profile declaring this id.
    pub rank: usize,
    /// Every requested profile declaring this id, in request order.
    pub declared_by: Vec<String>,
    /// Conflicting id mapped to the first profile that declared the conflict.
    pub conflict_sources: BTreeMap<String, String>,
}

/// Result of [`merge`].
#[derive(Debug, Clone, Default)]
pub struct MergedSet {
    /// Components in first-appearance order.
    pub components: Vec<MergedComponent>,
    pub warnings: Vec<VersionOverride>,
}

impl MergedSet {
    pub fn get(&self, id: &str) -> Option<&MergedComponent> {
        self.components.iter().find(|c| c.component.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

/// Merge the components of `profiles` (already deduplicated, in request order).
///
/// An id declared more than once keeps its highest version. `depends_on` and
/// `conflicts_with` are unioned across all declarations.
pub fn merge(profiles: &[&Profile]) -> MergedSet {
    let mut set = MergedSet::default();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (rank, profile) in profiles.iter().enumerate() {
        for component in &profile.components {
            match index.get(&component.id) {
                None => {
                    index.insert(component.id.clone(), set.components.len());
                    set.components.push(MergedComponent {
                        component: component.clone(),
                        profile_id: profile.id.clone(),
                        rank,
                        declared_by: vec![profile.id.clone()],
                        conflict_sources: component
                            .conflicts_with
                            .iter()
                            .map(|c| (c.clone(), profile.id.clone()))
                            .collect(),
                    });
                }
                Some(&at) => {
                    let existing = &mut set.components[at];
                    if let Some(warning) = merge_into(existing, component, &profile.id) {
                        tracing::warn!("{}", warning);
                        set.warnings.push(warning);
                    }
                }
            }
        }
    }

    set
}

fn merge_into(
    existing: &mut MergedComponent,
    incoming: &Component,
    profile_id: &str,
) -> Option<VersionOverride> {
    existing.declared_by.push(profile_id.to_string());
    for conflict in &incoming.conflicts_with {
        existing
            .conflict_sources
            .entry(conflict.clone())
            .or_insert_with(|| profile_id.to_string());
    }

    let mut depends_on = existing.component.depends_on.clone();
    depends_on.extend(incoming.depends_on.iter().cloned());
    let mut conflicts_with = existing.component.conflicts_with.clone();
    conflicts_with.extend(incoming.conflicts_with.iter().cloned());

    let warning = if incoming.version > existing.component.version {
        let warning = VersionOverride {
            component: incoming.id.clone(),
            kept_version: incoming.version.to_string(),
            kept_from: profile_id.to_string(),
            overridden_version: existing.component.version.to_string(),
            overridden_from: existing.profile_id.clone(),
        };
        existing.component = incoming.clone();
        existing.profile_id = profile_id.to_string();
        Some(warning)
    } else if incoming.version < existing.component.version {
        Some(VersionOverride {
            component: incoming.id.clone(),
            kept_version: existing.component.version.to_string(),
            kept_from: existing.profile_id.clone(),
            overridden_version: incoming.version.to_string(),
            overridden_from: profile_id.to_string(),
        })
    } else {
        None
    };

    existing.component.depends_on = depends_on;
    existing.component.conflicts_with = conflicts_with;
    warning
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Category;

    fn profile(id: &str, components: Vec<Component>) -> Profile {
        components
            .into_iter()
            .fold(Profile::new(id, Category::Web), |p, c| p.with_component(c))
    }

    #[test]
    fn union_keeps_first_appearance_order() {
        let a = profile("a", vec![Component::new("git", "2.43"), Component::new("node", "20")]);
        let b = profile("b", vec![Component::new("python", "3.12"), Component::new("git", "2.43")]);
        let set = merge(&[&a, &b]);

        let ids: Vec<_> = set.components.iter().map(|c| c.component.id.as_str()).collect();
        assert_eq!(ids, vec!["git", "node", "python"]);
        assert_eq!(set.get("git").unwrap().declared_by, vec!["a", "b"]);
        assert_eq!(set.get("python").unwrap().rank, 1);
        assert!(set.warnings.is_empty());
    }

    #[test]
    fn higher_version_wins_with_warning() {
        let a = profile("web-a", vec![Component::new("nodejs-18", "18.18")]);
        let b = profile("web-b", vec![Component::new("nodejs-18", "18.19")]);
        let set = merge(&[&a, &b]);

        let node = set.get("nodejs-18").unwrap();
        assert_eq!(node.component.version.as_str(), "18.19");
        assert_eq!(node.profile_id, "web-b");
        assert_eq!(node.rank, 0);
        assert_eq!(
            set.warnings,
            vec![VersionOverride {
                component: "nodejs-18".to_string(),
                kept_version: "18.19".to_string(),
                kept_from: "web-b".to_string(),
                overridden_version: "18.18".to_string(),
                overridden_from: "web-a".to_string(),
            }]
        );
    }

    #[test]
    fn lower_later_version_is_overridden() {
        let a = profile("a", vec![Component::new("python", "3.11.8")]);
        let b = profile("b", vec![Component::new("python", "3.11.7")]);
        let set = merge(&[&a, &b]);

        assert_eq!(set.get("python").unwrap().component.version.as_str(), "3.11.8");
        assert_eq!(set.warnings[0].overridden_from, "b");
        assert_eq!(
            set.warnings[0].to_string(),
            "python: using 3.11.8 from 'a' instead of 3.11.7 from 'b'"
        );
    }

    #[test]
    fn relations_are_unioned_across_declarations() {
        let a = profile(
            "a",
            vec![
                Component::new("conda", "24"),
                Component::new("python", "3.11").depends_on("conda").conflicts_with("pyenv"),
            ],
        );
        let b = profile(
            "b",
            vec![
                Component::new("pip", "24"),
                Component::new("python", "3.12").depends_on("pip"),
            ],
        );
        let set = merge(&[&a, &b]);
        let python = set.get("python").unwrap();

        assert!(python.component.depends_on.contains("conda"));
        assert!(python.component.depends_on.contains("pip"));
        assert!(python.component.conflicts_with.contains("pyenv"));
        assert_eq!(python.conflict_sources["pyenv"], "a");
    }

    #[test]
    fn equal_versions_merge_silently() {
        let a = profile("a", vec![Component::new("git", "2.44")]);
        let b = profile("b", vec![Component::new("git", "2.44.0")]);
        let set = merge(&[&a, &b]);
        assert!(set.warnings.is_empty());
        assert_eq!(set.get("git").unwrap().profile_id, "a");
    }
}
