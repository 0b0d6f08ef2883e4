use std::collections::VecDeque;

use slab::Slab;

use crate::cluster::{Cluster, ClusterId};

/// Doubly linked sequence of clusters stored in an arena.
///
/// The arena owns every cluster; `prev`/`next` are plain handles into it, so
/// unlinking a cluster never has to untangle ownership.
pub struct Chain<T, const N: usize> {
    clusters: Slab<Cluster<T, N>>,
    first: Option<ClusterId>,
    last: Option<ClusterId>,
}

impl<T, const N: usize> Chain<T, N> {
    pub fn new() -> Self {
        Self {
            clusters: Slab::new(),
            first: None,
            last: None,
        }
    }

    #[inline]
    pub const fn first(&self) -> Option<ClusterId> {
        self.first
    }

    #[inline]
    pub const fn last(&self) -> Option<ClusterId> {
        self.last
    }

    #[inline]
    pub fn cluster(&self, id: ClusterId) -> &Cluster<T, N> {
        &self.clusters[id.0]
    }

    #[inline]
    pub fn cluster_mut(&mut self, id: ClusterId) -> &mut Cluster<T, N> {
        &mut self.clusters[id.0]
    }

    /// Links `cluster` after the current last one and returns its handle.
    pub fn push_back(&mut self, cluster: Cluster<T, N>) -> ClusterId {
        match self.last {
            Some(last) => self.insert_after(last, cluster),
            None => {
                let id = ClusterId(self.clusters.insert(cluster));
                self.first = Some(id);
                self.last = Some(id);
                tracing::trace!(cluster = id.0, "allocated first cluster");
                id
            }
        }
    }

    /// Links `cluster` right after `anchor` and returns its handle.
    pub fn insert_after(&mut self, anchor: ClusterId, mut cluster: Cluster<T, N>) -> ClusterId {
        let next = self.cluster(anchor).next();
        *cluster.prev_mut() = Some(anchor);
        *cluster.next_mut() = next;

        let id = ClusterId(self.clusters.insert(cluster));
        *self.cluster_mut(anchor).next_mut() = Some(id);

        match next {
            Some(next) => *self.cluster_mut(next).prev_mut() = Some(id),
            None => self.last = Some(id),
        }

        tracing::trace!(cluster = id.0, after = anchor.0, "allocated cluster");
        id
    }

    /// Unlinks `id` from the chain and releases its slot.
    pub fn unlink(&mut self, id: ClusterId) -> Cluster<T, N> {
        let cluster = self.clusters.remove(id.0);
        let (prev, next) = (cluster.prev(), cluster.next());

        match prev {
            Some(prev) => *self.cluster_mut(prev).next_mut() = next,
            None => self.first = next,
        }

        match next {
            Some(next) => *self.cluster_mut(next).prev_mut() = prev,
            None => self.last = prev,
        }

        tracing::trace!(cluster = id.0, "released cluster");
        cluster
    }

    pub fn clear(&mut self) {
        self.clusters.clear();
        self.first = None;
        self.last = None;
    }

    /// Handles of all clusters, first to last.
    pub fn ids(&self) -> ClusterIds<'_, T, N> {
        ClusterIds {
            chain: self,
            next: self.first,
        }
    }

    /// Detaches every cluster's storage, preserving chain order.
    pub fn into_ordered(mut self) -> VecDeque<Vec<T>> {
        let mut ordered = VecDeque::with_capacity(self.clusters.len());
        let mut cursor = self.first;

        while let Some(id) = cursor {
            let cluster = self.clusters.remove(id.0);
            cursor = cluster.next();
            ordered.push_back(cluster.into_items());
        }

        ordered
    }

    /// Checks link symmetry, endpoint markers and the absence of empty clusters.
    pub fn validate(&self) -> Result<(), &'static str> {
        let (Some(first), Some(last)) = (self.first, self.last) else {
            if self.first.is_some() || self.last.is_some() || !self.clusters.is_empty() {
                return Err("only one chain endpoint is set");
            }

            return Ok(());
        };

        if self.cluster(first).prev().is_some() {
            return Err("first cluster has a predecessor");
        }

        if self.cluster(last).next().is_some() {
            return Err("last cluster has a successor");
        }

        let mut visited = 0;
        let mut prev = None;
        let mut cursor = Some(first);

        while let Some(id) = cursor {
            let Some(cluster) = self.clusters.get(id.0) else {
                return Err("chain links a released cluster");
            };

            if cluster.is_empty() {
                return Err("chain contains an empty cluster");
            }

            if cluster.len() > N {
                return Err("cluster exceeds its capacity");
            }

            if cluster.prev() != prev {
                return Err("asymmetric cluster links");
            }

            visited += 1;
            if visited > self.clusters.len() {
                return Err("chain contains a cycle");
            }

            prev = Some(id);
            cursor = cluster.next();
        }

        if prev != Some(last) {
            return Err("forward walk does not end at the last cluster");
        }

        if visited != self.clusters.len() {
            return Err("arena holds clusters unreachable from the chain");
        }

        Ok(())
    }
}

/// Iterator over cluster handles in chain order.
pub struct ClusterIds<'a, T, const N: usize> {
    chain: &'a Chain<T, N>,
    next: Option<ClusterId>,
}

impl<T, const N: usize> Iterator for ClusterIds<'_, T, N> {
    type Item = ClusterId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.chain.cluster(id).next();
        Some(id)
    }
}

impl<T: Clone, const N: usize> Clone for Chain<T, N> {
    fn clone(&self) -> Self {
        Self {
            clusters: self.clusters.clone(),
            first: self.first,
            last: self.last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Chain;
    use crate::cluster::Cluster;

    fn filled(values: &[i32]) -> Cluster<i32, 4> {
        Cluster::from_items(values.to_vec())
    }

    fn contents(chain: &Chain<i32, 4>) -> Vec<Vec<i32>> {
        chain
            .ids()
            .map(|id| chain.cluster(id).as_slice().to_vec())
            .collect()
    }

    #[test]
    fn test_new_chain_is_empty_and_valid() {
        let sut: Chain<i32, 4> = Chain::new();
        assert_eq!(sut.first(), None);
        assert_eq!(sut.last(), None);
        assert_eq!(sut.ids().count(), 0);
        assert_eq!(sut.validate(), Ok(()));
    }

    #[test]
    fn test_push_back_links_clusters_in_order() {
        let mut sut: Chain<i32, 4> = Chain::new();
        let a = sut.push_back(filled(&[0, 1]));
        let b = sut.push_back(filled(&[2]));

        assert_eq!(sut.first(), Some(a));
        assert_eq!(sut.last(), Some(b));
        assert_eq!(sut.cluster(a).next(), Some(b));
        assert_eq!(sut.cluster(b).prev(), Some(a));
        assert_eq!(contents(&sut), vec![vec![0, 1], vec![2]]);
        assert_eq!(sut.validate(), Ok(()));
    }

    #[test]
    fn test_insert_after_relinks_neighbours() {
        let mut sut: Chain<i32, 4> = Chain::new();
        let a = sut.push_back(filled(&[0]));
        let c = sut.push_back(filled(&[2]));
        let b = sut.insert_after(a, filled(&[1]));

        assert_eq!(sut.cluster(a).next(), Some(b));
        assert_eq!(sut.cluster(b).prev(), Some(a));
        assert_eq!(sut.cluster(b).next(), Some(c));
        assert_eq!(sut.cluster(c).prev(), Some(b));
        assert_eq!(sut.last(), Some(c));
        assert_eq!(contents(&sut), vec![vec![0], vec![1], vec![2]]);
        assert_eq!(sut.validate(), Ok(()));
    }

    #[test]
    fn test_unlink_fixes_endpoints() {
        let mut sut: Chain<i32, 4> = Chain::new();
        let a = sut.push_back(filled(&[0]));
        let b = sut.push_back(filled(&[1]));
        let c = sut.push_back(filled(&[2]));

        sut.unlink(b);
        assert_eq!(contents(&sut), vec![vec![0], vec![2]]);
        assert_eq!(sut.validate(), Ok(()));

        sut.unlink(a);
        assert_eq!(sut.first(), Some(c));
        assert_eq!(sut.cluster(c).prev(), None);
        assert_eq!(sut.validate(), Ok(()));

        sut.unlink(c);
        assert_eq!(sut.first(), None);
        assert_eq!(sut.last(), None);
        assert_eq!(sut.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_empty_cluster() {
        let mut sut: Chain<i32, 4> = Chain::new();
        let a = sut.push_back(filled(&[0]));
        sut.cluster_mut(a).remove(0);

        assert_eq!(sut.validate(), Err("chain contains an empty cluster"));
    }

    #[test]
    fn test_into_ordered_follows_links_not_slots() {
        let mut sut: Chain<i32, 4> = Chain::new();
        let a = sut.push_back(filled(&[0]));
        sut.push_back(filled(&[3]));
        sut.insert_after(a, filled(&[1, 2]));

        let ordered = sut.into_ordered();
        assert_eq!(ordered, [vec![0], vec![1, 2], vec![3]]);
    }

    #[test]
    fn test_clone_preserves_layout() {
        let mut sut: Chain<i32, 4> = Chain::new();
        let a = sut.push_back(filled(&[0, 1]));
        sut.push_back(filled(&[3]));
        sut.insert_after(a, filled(&[2]));

        let cloned = sut.clone();
        assert_eq!(contents(&cloned), contents(&sut));
        assert_eq!(cloned.first(), sut.first());
        assert_eq!(cloned.last(), sut.last());
        assert_eq!(cloned.validate(), Ok(()));
    }
}
