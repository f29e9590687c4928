//! Partition of alias strings into disjoint equivalence classes.
//!
//! Classes live in an arena and are addressed by [`ClassId`]. Every alias
//! key points at exactly one live class, and every live class contains all
//! keys pointing at it. A merge that touches several classes fuses them into
//! the oldest one and repoints the keys of the others, so lookups stay a
//! single hash probe.

use std::collections::HashMap;

use tracing::debug;

use super::aliases::{alias_key, AliasSet};

/// Handle of an equivalence class inside an [`AliasIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(usize);

/// Equivalence classes of aliases, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    /// Arena of classes. Absorbed classes are left empty.
    classes: Vec<AliasSet>,
    /// Normalized alias -> owning class.
    keys: HashMap<String, ClassId>,
}

impl AliasIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a set of aliases known to denote one person.
    ///
    /// Every class already holding one of the aliases is fused with the new
    /// set. The oldest of those classes survives and keeps its member order;
    /// members of the absorbed classes follow in class order, then the new
    /// aliases in iteration order. Returns `None` for an empty input.
    pub fn merge<I, S>(&mut self, aliases: I) -> Option<ClassId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let incoming: AliasSet = aliases.into_iter().collect();
        if incoming.is_empty() {
            return None;
        }

        let mut referenced: Vec<ClassId> =
            incoming.iter().filter_map(|a| self.class_id(a)).collect();
        referenced.sort_unstable();
        referenced.dedup();

        let survivor = match referenced.first() {
            Some(&id) => id,
            None => {
                self.classes.push(AliasSet::new());
                ClassId(self.classes.len() - 1)
            }
        };

        if referenced.len() > 1 {
            debug!(
                survivor = survivor.0,
                fused = referenced.len(),
                "fusing alias classes"
            );
        }

        for &absorbed in referenced.iter().skip(1) {
            let members = std::mem::take(&mut self.classes[absorbed.0]);
            for alias in members.iter() {
                self.keys.insert(alias_key(alias), survivor);
            }
            self.classes[survivor.0].extend_from(&members);
        }

        for alias in incoming {
            self.keys.insert(alias_key(&alias), survivor);
            self.classes[survivor.0].insert(alias);
        }

        Some(survivor)
    }

    /// The class an alias currently belongs to.
    pub fn class_id(&self, alias: &str) -> Option<ClassId> {
        self.keys.get(&alias_key(alias)).copied()
    }

    /// Members of the class an alias currently belongs to.
    pub fn lookup(&self, alias: &str) -> Option<&AliasSet> {
        self.class_id(alias).map(|id| &self.classes[id.0])
    }

    /// Canonical representative (first member) of an alias's class.
    pub fn representative(&self, alias: &str) -> Option<&str> {
        self.lookup(alias).and_then(AliasSet::first)
    }

    /// Live classes in creation order.
    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &AliasSet)> {
        self.classes
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_empty())
            .map(|(i, c)| (ClassId(i), c))
    }

    /// Number of live classes.
    pub fn len(&self) -> usize {
        self.classes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of distinct alias keys.
    pub fn alias_count(&self) -> usize {
        self.keys.len()
    }
}
