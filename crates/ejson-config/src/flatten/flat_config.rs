//! [`FlatConfig`]: ordered, case-insensitive path → value map.

use std::collections::{hash_map::Entry, HashMap};

use super::FlattenError;

/// Flattened configuration produced by [`flatten`](super::flatten).
///
/// Lookups ignore case; iteration follows first-insertion order. A `None` value
/// is a JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatConfig {
    entries: Vec<(String, Option<String>)>,
    /// Case-folded path → position in `entries`.
    index: HashMap<String, usize>,
}

impl FlatConfig {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a new path.
    ///
    /// # Errors
    ///
    /// Returns [`FlattenError::DuplicateKey`] if the path is already present under
    /// case-insensitive comparison. The existing entry is left untouched.
    pub fn try_insert(&mut self, path: String, value: Option<String>) -> Result<(), FlattenError> {
        match self.index.entry(fold(&path)) {
            Entry::Occupied(_) => Err(FlattenError::DuplicateKey(path)),
            Entry::Vacant(slot) => {
                slot.insert(self.entries.len());
                self.entries.push((path, value));
                Ok(())
            }
        }
    }

    /// Value at `path`; `None` when the path is absent or its value is `null`.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.get_entry(path).and_then(|(_, value)| value)
    }

    /// The stored path spelling and value at `path`.
    pub fn get_entry(&self, path: &str) -> Option<(&str, Option<&str>)> {
        self.index.get(&fold(path)).map(|&i| {
            let (key, value) = &self.entries[i];
            (key.as_str(), value.as_deref())
        })
    }

    /// Returns `true` if `path` is present, including with a `null` value.
    pub fn contains_key(&self, path: &str) -> bool {
        self.index.contains_key(&fold(path))
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    /// Paths in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

fn fold(path: &str) -> String {
    path.to_lowercase()
}
