//! Lazy, restartable profile search.

use std::slice;

use super::Registry;
use crate::profile::Profile;

/// Profiles matching a query, in display order.
///
/// Nothing is evaluated until iteration. Every call to [`Search::iter`]
/// starts over from the first profile, so the same `Search` can be walked
/// any number of times.
#[derive(Debug, Clone)]
pub struct Search<'r> {
    registry: &'r Registry,
    needle: String,
}

impl<'r> Search<'r> {
    pub(crate) fn new(registry: &'r Registry, query: &str) -> Self {
        Self {
            registry,
            needle: query.trim().to_lowercase(),
        }
    }

    /// The normalized query.
    pub fn query(&self) -> &str {
        &self.needle
    }

    /// Iterate matches from the beginning.
    pub fn iter(&self) -> SearchIter<'_> {
        SearchIter {
            registry: self.registry,
            ids: self.registry.order.iter(),
            needle: &self.needle,
        }
    }
}

impl<'a, 'r> IntoIterator for &'a Search<'r> {
    type Item = &'a Profile;
    type IntoIter = SearchIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over one pass of a [`Search`].
#[derive(Debug, Clone)]
pub struct SearchIter<'a> {
    registry: &'a Registry,
    ids: slice::Iter<'a, String>,
    needle: &'a str,
}

impl<'a> Iterator for SearchIter<'a> {
    type Item = &'a Profile;

    fn next(&mut self) -> Option<Self::Item> {
        let registry = self.registry;
        let needle = self.needle;
        self.ids
            .by_ref()
            .filter_map(|id| registry.profiles.get(id))
            .find(|profile| needle.is_empty() || profile.matches(needle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.ids.len()))
    }
}

#[cfg(test)]
mod tests {
    use crate::profile::{Category, Component, Profile};
    use crate::registry::Registry;

    fn registry() -> Registry {
        let mut rails = Profile::new("backend-rails", Category::Backend)
            .with_component(Component::new("ruby", "3.3"));
        rails.name = "Ruby on Rails".to_string();
        let mut django = Profile::new("web-django", Category::Web)
            .with_component(Component::new("python", "3.12"));
        django.description = "Python web framework".to_string();
        let pytorch = Profile::new("ml-pytorch", Category::MachineLearning)
            .with_component(Component::new("python", "3.11"));
        Registry::from_profiles(vec![rails, django, pytorch]).unwrap()
    }

    #[test]
    fn matches_case_insensitively() {
        let registry = registry();
        let search = registry.search("PYTHON");
        let ids: Vec<_> = search.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["web-django"]);
    }

    #[test]
    fn matches_category() {
        let registry = registry();
        let search = registry.search("machine learning");
        let ids: Vec<_> = search
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["ml-pytorch"]);
    }

    #[test]
    fn empty_query_matches_everything_in_order() {
        let registry = registry();
        let search = registry.search("");
        let ids: Vec<_> = search.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["backend-rails", "web-django", "ml-pytorch"]);
    }

    #[test]
    fn search_is_restartable() {
        let registry = registry();
        let search = registry.search("-");
        let first: Vec<_> = search.iter().map(|p| p.id.clone()).collect();
        let second: Vec<_> = (&search).into_iter().map(|p| p.id.clone()).collect();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn search_is_lazy_and_partial_iteration_does_not_consume() {
        let registry = registry();
        let search = registry.search("");
        assert_eq!(search.iter().next().map(|p| p.id.as_str()), Some("backend-rails"));
        assert_eq!(search.iter().count(), 3);
    }

    #[test]
    fn no_matches_is_empty() {
        let registry = registry();
        assert_eq!(registry.search("haskell").iter().count(), 0);
    }
}
