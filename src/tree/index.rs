//! Lookup structures over the place arena.

use hashbrown::HashMap;
use std::collections::BTreeSet;

use crate::models::PlaceId;

/// Path → place, one to one.
#[derive(Debug, Default)]
pub struct PathIndex {
    by_path: HashMap<String, PlaceId>,
}

impl PathIndex {
    pub fn get(&self, path: &str) -> Option<PlaceId> {
        self.by_path.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Register a path; returns false (and changes nothing) if it is taken.
    pub fn insert(&mut self, path: &str, id: PlaceId) -> bool {
        if self.by_path.contains_key(path) {
            return false;
        }
        self.by_path.insert(path.to_string(), id);
        true
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

/// Lowercased name → places carrying it, many to many.
///
/// Place sets are ordered by id, i.e. creation order, so lookups are
/// deterministic.
#[derive(Debug, Default)]
pub struct NameIndex {
    by_name: HashMap<String, BTreeSet<PlaceId>>,
}

impl NameIndex {
    pub fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    pub fn insert(&mut self, name: &str, id: PlaceId) {
        let key = Self::key(name);
        if key.is_empty() {
            return;
        }
        self.by_name.entry(key).or_default().insert(id);
    }

    pub fn get(&self, name: &str) -> impl Iterator<Item = PlaceId> + '_ {
        self.by_name
            .get(&Self::key(name))
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Outcome of [`CodeIndex::rebind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rebind {
    /// The place's previous code was unbound
    pub released: bool,
    /// Another place held the new code and lost it
    pub evicted: Option<PlaceId>,
}

/// Stats code → place. Single-valued at every instant; codes move between
/// places only through [`CodeIndex::rebind`].
#[derive(Debug, Default)]
pub struct CodeIndex {
    by_code: HashMap<String, PlaceId>,
}

impl CodeIndex {
    pub fn get(&self, code: &str) -> Option<PlaceId> {
        self.by_code.get(code).copied()
    }

    /// Move `id` from `previous` to `code` in one step.
    ///
    /// The old binding is removed only if it still points at `id`. Whoever
    /// held `code` before is evicted and reported back so the caller can
    /// clear that place's code.
    pub fn rebind(&mut self, id: PlaceId, previous: Option<&str>, code: &str) -> Rebind {
        let mut outcome = Rebind::default();

        if let Some(previous) = previous {
            if previous != code && self.by_code.get(previous) == Some(&id) {
                self.by_code.remove(previous);
                outcome.released = true;
            }
        }

        if let Some(holder) = self.by_code.insert(code.to_string(), id) {
            if holder != id {
                outcome.evicted = Some(holder);
            }
        }

        outcome
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PlaceId)> {
        self.by_code.iter().map(|(code, id)| (code.as_str(), *id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_index_rejects_duplicates() {
        let mut index = PathIndex::default();
        assert!(index.insert("jawa-tengah", PlaceId(0)));
        assert!(!index.insert("jawa-tengah", PlaceId(1)));
        assert_eq!(index.get("jawa-tengah"), Some(PlaceId(0)));
    }

    #[test]
    fn test_name_index_is_case_insensitive_and_ordered() {
        let mut index = NameIndex::default();
        index.insert("Sukajadi", PlaceId(7));
        index.insert("SUKAJADI", PlaceId(3));
        index.insert("sukajadi", PlaceId(7));
        let ids: Vec<_> = index.get(" sukajadi ").collect();
        assert_eq!(ids, vec![PlaceId(3), PlaceId(7)]);
        assert_eq!(index.get("bogor").count(), 0);
    }

    #[test]
    fn test_rebind_moves_code() {
        let mut index = CodeIndex::default();
        index.rebind(PlaceId(1), None, "330101");
        let outcome = index.rebind(PlaceId(1), Some("330101"), "3301010");
        assert!(outcome.released);
        assert_eq!(outcome.evicted, None);
        assert_eq!(index.get("330101"), None);
        assert_eq!(index.get("3301010"), Some(PlaceId(1)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_rebind_evicts_previous_holder() {
        let mut index = CodeIndex::default();
        index.rebind(PlaceId(1), None, "3301");
        index.rebind(PlaceId(2), None, "3302");
        let outcome = index.rebind(PlaceId(2), Some("3302"), "3301");
        assert_eq!(outcome.evicted, Some(PlaceId(1)));
        assert_eq!(index.get("3301"), Some(PlaceId(2)));
        assert_eq!(index.get("3302"), None);
    }

    #[test]
    fn test_rebind_keeps_binding_owned_by_other_place() {
        let mut index = CodeIndex::default();
        index.rebind(PlaceId(1), None, "17");
        // Place 2 claims to have held "17" but does not.
        let outcome = index.rebind(PlaceId(2), Some("17"), "1771");
        assert!(!outcome.released);
        assert_eq!(index.get("17"), Some(PlaceId(1)));
    }
}
