use rustc_hash::FxHashMap;

use crate::chain::Chain;
use crate::cluster::ClusterId;

/// Number of elements served by each rail.
pub const RAIL_SPACING: usize = 5000;

/// A cursor remembering a cluster and the logical index of its first element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Rail {
    cluster: ClusterId,
    start: usize,
}

impl Rail {
    /// Moves the rail until its cluster covers `index`.
    fn move_to<T, const N: usize>(&mut self, chain: &Chain<T, N>, len: usize, index: usize) {
        self.jump_to_closest_end(chain, len, index);

        while index < self.start {
            self.cluster = chain
                .cluster(self.cluster)
                .prev()
                .expect("rail walked past the first cluster");
            self.start -= chain.cluster(self.cluster).len();
        }

        loop {
            let cluster = chain.cluster(self.cluster);
            if index < self.start + cluster.len() {
                break;
            }

            self.start += cluster.len();
            self.cluster = cluster.next().expect("rail walked past the last cluster");
        }
    }

    fn jump_to_closest_end<T, const N: usize>(
        &mut self,
        chain: &Chain<T, N>,
        len: usize,
        index: usize,
    ) {
        let distance = self.start.abs_diff(index);
        let end_distance = len - index;

        if index < distance && index < end_distance {
            if let Some(first) = chain.first() {
                self.cluster = first;
                self.start = 0;
            }
        } else if end_distance < distance && end_distance < index {
            if let Some(last) = chain.last() {
                self.cluster = last;
                self.start = len - chain.cluster(last).len();
            }
        }
    }
}

/// Memoized start index of clusters, resolved by walking forward from the
/// first cluster only as far as a query needs.
#[derive(Default)]
struct StartOffsets {
    known: FxHashMap<ClusterId, usize>,
    frontier: Option<(ClusterId, usize)>,
}

impl StartOffsets {
    fn start_of<T, const N: usize>(&mut self, chain: &Chain<T, N>, target: ClusterId) -> usize {
        if let Some(&start) = self.known.get(&target) {
            return start;
        }

        let (mut cursor, mut start) = match self.frontier {
            Some((id, start)) => {
                let cluster = chain.cluster(id);
                (cluster.next(), start + cluster.len())
            }
            None => (chain.first(), 0),
        };

        loop {
            let id = cursor.expect("cluster is not linked into the chain");
            self.known.insert(id, start);
            self.frontier = Some((id, start));

            if id == target {
                return start;
            }

            let cluster = chain.cluster(id);
            start += cluster.len();
            cursor = cluster.next();
        }
    }
}

/// Derived positional state of a list: rails plus cluster start offsets.
///
/// Only valid for the chain layout it was built against; the owner replaces it
/// with a fresh value after every structural mutation.
#[derive(Default)]
pub struct PositionCache {
    rails: Vec<Rail>,
    last_used: Option<usize>,
    offsets: StartOffsets,
}

impl PositionCache {
    /// Returns the cluster covering `index` and the index of its first element.
    ///
    /// `index` must be lower than `len`, the element count of `chain`.
    pub fn locate<T, const N: usize>(
        &mut self,
        chain: &Chain<T, N>,
        len: usize,
        index: usize,
    ) -> (ClusterId, usize) {
        debug_assert!(index < len);

        let fastest = self.fastest_rail::<T, N>(chain, len, index);
        let rail = &mut self.rails[fastest];
        rail.move_to(chain, len, index);

        (rail.cluster, rail.start)
    }

    /// Logical index of the first element of `cluster`.
    pub fn start_of<T, const N: usize>(&mut self, chain: &Chain<T, N>, cluster: ClusterId) -> usize {
        self.offsets.start_of(chain, cluster)
    }

    fn fastest_rail<T, const N: usize>(
        &mut self,
        chain: &Chain<T, N>,
        len: usize,
        index: usize,
    ) -> usize {
        if self.rails.len() < len.div_ceil(RAIL_SPACING) {
            let first = chain.first().expect("non-empty list has a first cluster");
            self.rails.push(Rail {
                cluster: first,
                start: 0,
            });

            tracing::trace!(rails = self.rails.len(), len, "laid a new rail");
        }

        let mut fastest = self.last_used.unwrap_or(0);
        let mut min_distance = self.rails[fastest].start.abs_diff(index);

        for (i, rail) in self.rails.iter().enumerate() {
            if min_distance <= N * 2 {
                break;
            }

            let distance = rail.start.abs_diff(index);
            if distance < min_distance {
                min_distance = distance;
                fastest = i;
            }
        }

        self.last_used = Some(fastest);
        fastest
    }
}

#[cfg(test)]
mod tests {
    use super::{PositionCache, RAIL_SPACING};
    use crate::chain::Chain;
    use crate::cluster::{Cluster, ClusterId};

    fn chain_of(sizes: &[usize]) -> (Chain<usize, 4>, Vec<ClusterId>, usize) {
        let mut chain = Chain::new();
        let mut ids = Vec::new();
        let mut next = 0;

        for &size in sizes {
            let values = (next..next + size).collect::<Vec<_>>();
            next += size;
            ids.push(chain.push_back(Cluster::from_items(values)));
        }

        (chain, ids, next)
    }

    #[test]
    fn test_locate_covers_every_index() {
        let (chain, _, len) = chain_of(&[4, 1, 3, 4, 2, 4, 1]);
        let mut sut = PositionCache::default();

        for index in 0..len {
            let (cluster, start) = sut.locate(&chain, len, index);
            let cluster = chain.cluster(cluster);
            assert!(start <= index && index < start + cluster.len());
            assert_eq!(cluster.get(index - start), Some(&index));
        }
    }

    #[test]
    fn test_locate_walks_backwards_too() {
        let (chain, _, len) = chain_of(&[4, 4, 4, 4, 4, 4, 4, 4]);
        let mut sut = PositionCache::default();

        for index in (0..len).rev() {
            let (cluster, start) = sut.locate(&chain, len, index);
            assert_eq!(chain.cluster(cluster).get(index - start), Some(&index));
        }
    }

    #[test]
    fn test_rails_grow_with_the_list() {
        let sizes = vec![4; (RAIL_SPACING * 2 + 1).div_ceil(4)];
        let (chain, _, len) = chain_of(&sizes);
        let mut sut = PositionCache::default();

        sut.locate(&chain, len, 10);
        assert_eq!(sut.rails.len(), 1);

        sut.locate(&chain, len, len / 2);
        sut.locate(&chain, len, len - 10);
        assert_eq!(sut.rails.len(), 3);

        sut.locate(&chain, len, len / 3);
        assert_eq!(sut.rails.len(), 3);
    }

    #[test]
    fn test_repeated_locate_is_stable() {
        let (chain, _, len) = chain_of(&[3, 4, 2, 4, 4, 1, 4]);
        let mut sut = PositionCache::default();

        let first = sut.locate(&chain, len, 9);
        let rail = sut.rails[0];
        assert_eq!(sut.locate(&chain, len, 9), first);
        assert_eq!(sut.rails[0], rail);
        assert_eq!(rail.cluster, first.0);
        assert_eq!(rail.start, first.1);
    }

    #[test]
    fn test_start_of_resolves_lazily() {
        let (chain, ids, _) = chain_of(&[4, 1, 3, 2]);
        let mut sut = PositionCache::default();

        assert_eq!(sut.start_of(&chain, ids[2]), 5);
        assert_eq!(sut.start_of(&chain, ids[0]), 0);
        assert_eq!(sut.start_of(&chain, ids[3]), 8);
        assert_eq!(sut.start_of(&chain, ids[1]), 4);
    }
}
