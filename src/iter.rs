use core::iter::FusedIterator;

use crate::chain::Chain;
use crate::cluster::ClusterId;
use crate::{ClusterCapacity, ClusterList, Usize};

/// An iterator over the elements of a ClusterList.
///
/// This struct is created by ClusterList::iter().
pub struct Iter<'a, T, const N: usize>
where
    Usize<N>: ClusterCapacity,
{
    chain: Option<&'a Chain<T, N>>,

    front: Option<ClusterId>,
    front_index: usize,

    back: Option<ClusterId>,
    back_index: usize,

    len: usize,
}

impl<T, const N: usize> Default for Iter<'_, T, N>
where
    Usize<N>: ClusterCapacity,
{
    fn default() -> Self {
        Self {
            chain: None,
            front: None,
            front_index: 0,
            back: None,
            back_index: 0,
            len: 0,
        }
    }
}

impl<'a, T, const N: usize> Iter<'a, T, N>
where
    Usize<N>: ClusterCapacity,
{
    pub(crate) fn from_list(list: &'a ClusterList<T, N>) -> Self {
        let chain = &list.chain;

        Self {
            chain: Some(chain),
            front: chain.first(),
            front_index: 0,
            back: chain.last(),
            back_index: chain.last().map_or(0, |id| chain.cluster(id).len()),
            len: list.len(),
        }
    }
}

impl<T, const N: usize> Clone for Iter<'_, T, N>
where
    Usize<N>: ClusterCapacity,
{
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, T, const N: usize> Iterator for Iter<'a, T, N>
where
    Usize<N>: ClusterCapacity,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let chain = self.chain?;
        let mut cluster = chain.cluster(self.front?);
        if self.front_index >= cluster.len() {
            self.front = cluster.next();
            self.front_index = 0;
            cluster = chain.cluster(self.front?);
        }

        let out = cluster.get(self.front_index);
        self.front_index += 1;
        self.len -= 1;
        out
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    #[inline]
    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<T, const N: usize> DoubleEndedIterator for Iter<'_, T, N>
where
    Usize<N>: ClusterCapacity,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let chain = self.chain?;
        let mut cluster = chain.cluster(self.back?);
        if self.back_index == 0 {
            self.back = cluster.prev();
            cluster = chain.cluster(self.back?);
            self.back_index = cluster.len();
        }

        self.back_index -= 1;
        self.len -= 1;
        cluster.get(self.back_index)
    }
}

impl<T, const N: usize> ExactSizeIterator for Iter<'_, T, N>
where
    Usize<N>: ClusterCapacity,
{
    fn len(&self) -> usize {
        self.len
    }
}

impl<T, const N: usize> FusedIterator for Iter<'_, T, N> where Usize<N>: ClusterCapacity {}

impl<T, const N: usize> core::fmt::Debug for Iter<'_, T, N>
where
    T: core::fmt::Debug,
    Usize<N>: ClusterCapacity,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Iter")
            .field(&self.clone().collect::<Vec<_>>())
            .field(&self.len)
            .finish()
    }
}
