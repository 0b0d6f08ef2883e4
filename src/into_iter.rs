use core::iter::FusedIterator;
use std::collections::{VecDeque, vec_deque};
use std::iter::Flatten;

use crate::{ClusterCapacity, ClusterList, Usize};

/// An owning iterator over the elements of a ClusterList.
///
/// This struct is created by ClusterList::into_iter().
#[derive(Clone)]
pub struct IntoIter<T, const N: usize>
where
    Usize<N>: ClusterCapacity,
{
    delegate: Flatten<vec_deque::IntoIter<Vec<T>>>,
    len: usize,
}

impl<T, const N: usize> Default for IntoIter<T, N>
where
    Usize<N>: ClusterCapacity,
{
    fn default() -> Self {
        Self {
            delegate: VecDeque::new().into_iter().flatten(),
            len: 0,
        }
    }
}

impl<T, const N: usize> IntoIter<T, N>
where
    Usize<N>: ClusterCapacity,
{
    pub(crate) fn from_list(list: ClusterList<T, N>) -> Self {
        let len = list.len();

        Self {
            delegate: list.chain.into_ordered().into_iter().flatten(),
            len,
        }
    }
}

impl<T, const N: usize> Iterator for IntoIter<T, N>
where
    Usize<N>: ClusterCapacity,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.delegate.next()?;
        self.len -= 1;
        Some(out)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    #[inline]
    fn count(self) -> usize {
        self.len
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }

    fn fold<B, F>(self, init: B, f: F) -> B
    where
        F: FnMut(B, Self::Item) -> B,
    {
        self.delegate.fold(init, f)
    }
}

impl<T, const N: usize> DoubleEndedIterator for IntoIter<T, N>
where
    Usize<N>: ClusterCapacity,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        let out = self.delegate.next_back()?;
        self.len -= 1;
        Some(out)
    }

    fn rfold<B, F>(self, init: B, f: F) -> B
    where
        F: FnMut(B, Self::Item) -> B,
    {
        self.delegate.rfold(init, f)
    }
}

impl<T, const N: usize> ExactSizeIterator for IntoIter<T, N>
where
    Usize<N>: ClusterCapacity,
{
    fn len(&self) -> usize {
        self.len
    }
}

impl<T, const N: usize> FusedIterator for IntoIter<T, N> where Usize<N>: ClusterCapacity {}

impl<T, const N: usize> core::fmt::Debug for IntoIter<T, N>
where
    T: core::fmt::Debug,
    Usize<N>: ClusterCapacity,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("IntoIter").field(&self.len).finish()
    }
}
