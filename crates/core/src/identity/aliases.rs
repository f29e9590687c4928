//! Ordered, case-insensitive set of alias strings.

use std::collections::HashSet;

/// Normalize an alias for use as a map key.
///
/// All alias lookups compare case-insensitively; this is the single place
/// that decides what "the same spelling" means.
pub fn alias_key(alias: &str) -> String {
    alias.to_lowercase()
}

/// A set of aliases that remembers insertion order.
///
/// Two spellings differing only in case are the same member; the first one
/// inserted is the one kept. Order matters because the first member of an
/// equivalence class becomes its canonical representative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasSet {
    members: Vec<String>,
    keys: HashSet<String>,
}

impl AliasSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an alias. Returns `false` if an equal spelling was present.
    pub fn insert(&mut self, alias: impl Into<String>) -> bool {
        let alias = alias.into();
        if self.keys.insert(alias_key(&alias)) {
            self.members.push(alias);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.keys.contains(&alias_key(alias))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.members.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Append every alias of `other` not yet present.
    pub fn extend_from(&mut self, other: &AliasSet) {
        for alias in other.iter() {
            self.insert(alias);
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        self.members
    }
}

impl<S: Into<String>> FromIterator<S> for AliasSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = AliasSet::new();
        for alias in iter {
            set.insert(alias);
        }
        set
    }
}

impl<S: Into<String>> Extend<S> for AliasSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for alias in iter {
            self.insert(alias);
        }
    }
}

impl IntoIterator for AliasSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_case_insensitive() {
        let mut set = AliasSet::new();
        assert!(set.insert("Jane Doe"));
        assert!(!set.insert("JANE DOE"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.first(), Some("Jane Doe"));
        assert!(set.contains("jane doe"));
    }

    #[test]
    fn test_keeps_insertion_order() {
        let set: AliasSet = ["b", "a", "c", "A"].into_iter().collect();
        assert_eq!(set.into_vec(), vec!["b", "a", "c"]);
    }
}
