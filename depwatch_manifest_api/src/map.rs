use std::collections::HashMap;

/// Insertion-ordered mapping from package name to declared version.
///
/// Inserting a name that already exists keeps its original position and
/// replaces the version, so merging sections behaves like a last-wins
/// dictionary merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl DependencyMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the version declared for `name`.
    pub fn insert(&mut self, name: impl Into<String>, version: impl Into<String>) {
        let name = name.into();
        let version = version.into();
        if let Some(&slot) = self.index.get(&name) {
            self.entries[slot].1 = version;
        } else {
            self.index.insert(name.clone(), self.entries.len());
            self.entries.push((name, version));
        }
    }

    /// Version declared for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&slot| self.entries[slot].1.as_str())
    }

    /// Whether `name` is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of declared packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no package is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, version)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(name, version)| (name.as_str(), version.as_str()))
    }
}

impl<N, V> FromIterator<(N, V)> for DependencyMap
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, version) in iter {
            map.insert(name, version);
        }
        map
    }
}
