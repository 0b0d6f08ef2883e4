use std::hash::{BuildHasher, Hash};

use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::cluster::ClusterId;

/// Hash used to key every lookup table.
#[inline]
pub fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    FxBuildHasher.hash_one(value)
}

/// Layered hash tables mapping an element hash to the cluster holding it.
///
/// A single table holds at most one entry per hash, so colliding or duplicate
/// elements spill into the next table that has room for their hash. Taken
/// together, the tables hold exactly one `hash -> cluster` entry per live
/// element.
#[derive(Clone, Default)]
pub struct LookupIndex {
    tables: Vec<FxHashMap<u64, ClusterId>>,
}

impl LookupIndex {
    pub const fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Records that an element hashing to `hash` lives in `cluster`.
    pub fn register(&mut self, hash: u64, cluster: ClusterId) {
        if let Some(table) = self.tables.iter_mut().find(|t| !t.contains_key(&hash)) {
            table.insert(hash, cluster);
            return;
        }

        let mut table = FxHashMap::default();
        table.insert(hash, cluster);
        self.tables.push(table);

        tracing::debug!(hash, tables = self.tables.len(), "lookup index grew a table");
    }

    /// Clusters registered under `hash`, in table order.
    pub fn candidates(&self, hash: u64) -> impl Iterator<Item = ClusterId> + '_ {
        self.tables
            .iter()
            .filter_map(move |table| table.get(&hash).copied())
    }

    /// First cluster registered under `hash` for which `matches` holds.
    ///
    /// The hash alone only narrows the search: `matches` must confirm that
    /// the cluster really stores an equal element.
    pub fn lookup<F>(&self, hash: u64, mut matches: F) -> Option<ClusterId>
    where
        F: FnMut(ClusterId) -> bool,
    {
        self.candidates(hash).find(|&cluster| matches(cluster))
    }

    /// Drops one `hash -> cluster` entry. Returns `false` when none exists.
    pub fn deregister(&mut self, hash: u64, cluster: ClusterId) -> bool {
        let Some(table) = self
            .tables
            .iter_mut()
            .find(|table| table.get(&hash) == Some(&cluster))
        else {
            return false;
        };

        table.remove(&hash);

        while self.tables.last().is_some_and(|table| table.is_empty()) {
            self.tables.pop();
        }

        true
    }

    /// Moves one `hash -> from` entry to `to`, registering it if missing.
    pub fn reassign(&mut self, hash: u64, from: ClusterId, to: ClusterId) {
        let slot = self
            .tables
            .iter_mut()
            .find_map(|table| table.get_mut(&hash).filter(|owner| **owner == from));

        match slot {
            Some(owner) => *owner = to,
            None => self.register(hash, to),
        }
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }

    /// Number of tables currently allocated.
    #[cfg(test)]
    pub fn tables_len(&self) -> usize {
        self.tables.len()
    }

    /// Every `(hash, cluster)` entry across all tables.
    pub fn entries(&self) -> impl Iterator<Item = (u64, ClusterId)> + '_ {
        self.tables
            .iter()
            .flat_map(|table| table.iter().map(|(&hash, &cluster)| (hash, cluster)))
    }
}

#[cfg(test)]
mod tests {
    use super::{LookupIndex, hash_of};
    use crate::cluster::ClusterId;

    const A: ClusterId = ClusterId(0);
    const B: ClusterId = ClusterId(1);
    const C: ClusterId = ClusterId(2);

    #[test]
    fn test_register_spills_equal_hashes_into_new_tables() {
        let mut sut = LookupIndex::new();
        sut.register(7, A);
        sut.register(8, A);
        assert_eq!(sut.tables_len(), 1);

        sut.register(7, B);
        assert_eq!(sut.tables_len(), 2);

        sut.register(7, C);
        assert_eq!(sut.tables_len(), 3);
        assert_eq!(sut.candidates(7).collect::<Vec<_>>(), vec![A, B, C]);
        assert_eq!(sut.candidates(8).collect::<Vec<_>>(), vec![A]);
    }

    #[test]
    fn test_lookup_applies_the_equality_guard() {
        let mut sut = LookupIndex::new();
        sut.register(7, A);
        sut.register(7, B);

        assert_eq!(sut.lookup(7, |_| true), Some(A));
        assert_eq!(sut.lookup(7, |cluster| cluster == B), Some(B));
        assert_eq!(sut.lookup(7, |_| false), None);
        assert_eq!(sut.lookup(9, |_| true), None);
    }

    #[test]
    fn test_deregister_removes_a_single_entry() {
        let mut sut = LookupIndex::new();
        sut.register(7, A);
        sut.register(7, B);

        assert!(sut.deregister(7, A));
        assert_eq!(sut.candidates(7).collect::<Vec<_>>(), vec![B]);
        assert!(!sut.deregister(7, A));

        sut.register(7, C);
        assert_eq!(sut.tables_len(), 2);
        assert_eq!(sut.candidates(7).collect::<Vec<_>>(), vec![C, B]);
    }

    #[test]
    fn test_deregister_trims_trailing_empty_tables() {
        let mut sut = LookupIndex::new();
        sut.register(7, A);
        sut.register(7, B);
        assert_eq!(sut.tables_len(), 2);

        assert!(sut.deregister(7, B));
        assert_eq!(sut.tables_len(), 1);

        assert!(sut.deregister(7, A));
        assert_eq!(sut.tables_len(), 0);
    }

    #[test]
    fn test_reassign_moves_one_entry_or_registers() {
        let mut sut = LookupIndex::new();
        sut.register(7, A);
        sut.register(7, A);

        sut.reassign(7, A, B);
        assert_eq!(sut.candidates(7).collect::<Vec<_>>(), vec![B, A]);

        sut.reassign(9, A, C);
        assert_eq!(sut.candidates(9).collect::<Vec<_>>(), vec![C]);
        assert_eq!(sut.entries().count(), 3);
    }

    #[test]
    fn test_hash_of_is_deterministic() {
        assert_eq!(hash_of(&42_u32), hash_of(&42_u32));
        assert_eq!(hash_of("cluster"), hash_of(&String::from("cluster")));
    }
}
